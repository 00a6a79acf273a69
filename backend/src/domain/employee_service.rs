//! Employee domain service.
//!
//! Implements [`EmployeeCommand`] and [`EmployeeQuery`]. Preconditions are
//! checked in a fixed order and the first failure is returned, so a rejected
//! write never reaches the store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::ports::{
    DepartmentRepository, EmployeeCommand, EmployeeQuery, EmployeeRepository,
    EmployeeRepositoryError,
};
use crate::domain::service_support::{
    field_details, log_rejection, map_department_repository_error, map_employee_repository_error,
    non_blank, require_name,
};
use crate::domain::tax_id::{self, TaxId, TaxIdError};
use crate::domain::{DepartmentId, Employee, EmployeeDraft, EmployeeFilter, EmployeeId, Error};

/// Employee service implementing the employee driving ports.
#[derive(Clone)]
pub struct EmployeeService<E, D> {
    employees: Arc<E>,
    departments: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<E, D> EmployeeService<E, D> {
    /// Create a service over the employee and department stores.
    pub fn new(employees: Arc<E>, departments: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            employees,
            departments,
            clock,
        }
    }
}

/// Fields of a draft that passed the store-independent checks.
struct ValidatedDraft {
    name: String,
    tax_id: TaxId,
    secondary_id: Option<String>,
    department_id: DepartmentId,
}

fn validate_draft(draft: &EmployeeDraft) -> Result<ValidatedDraft, Error> {
    let name = require_name(&draft.name)?;
    let tax_id = TaxId::parse(&draft.tax_id).map_err(|err| {
        let code = match err {
            TaxIdError::WrongLength { .. } => "wrong_length",
            TaxIdError::RepeatedDigits => "repeated_digits",
            TaxIdError::ChecksumMismatch => "checksum_mismatch",
        };
        Error::invalid_request(format!("invalid tax id: {err}")).with_details(field_details(
            "taxId",
            Some(draft.tax_id.clone()),
            code,
        ))
    })?;
    let department_id = draft.department_id.ok_or_else(|| {
        Error::invalid_request("departmentId is required")
            .with_details(field_details("departmentId", None, "missing_department"))
    })?;
    Ok(ValidatedDraft {
        name,
        tax_id,
        secondary_id: draft.normalized_secondary_id(),
        department_id,
    })
}

fn not_found(id: EmployeeId) -> Error {
    Error::not_found(format!("employee {id} not found"))
}

impl<E, D> EmployeeService<E, D>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
{
    async fn fetch(&self, id: EmployeeId) -> Result<Employee, Error> {
        self.employees
            .find_by_id(&id)
            .await
            .map_err(map_employee_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Fail unless no employee other than `owner` holds `tax_id`.
    async fn ensure_tax_id_free(
        &self,
        tax_id: &TaxId,
        owner: Option<EmployeeId>,
    ) -> Result<(), Error> {
        let holder = self
            .employees
            .find_by_tax_id(tax_id)
            .await
            .map_err(map_employee_repository_error)?;
        match holder {
            Some(other) if Some(other.id) != owner => Err(map_employee_repository_error(
                EmployeeRepositoryError::duplicate_tax_id(tax_id.as_str()),
            )),
            _ => Ok(()),
        }
    }

    /// Fail unless no employee other than `owner` holds `secondary_id`.
    async fn ensure_secondary_id_free(
        &self,
        secondary_id: &str,
        owner: Option<EmployeeId>,
    ) -> Result<(), Error> {
        let holder = self
            .employees
            .find_by_secondary_id(secondary_id)
            .await
            .map_err(map_employee_repository_error)?;
        match holder {
            Some(other) if Some(other.id) != owner => Err(map_employee_repository_error(
                EmployeeRepositoryError::duplicate_secondary_id(secondary_id),
            )),
            _ => Ok(()),
        }
    }

    async fn ensure_department_exists(&self, department_id: DepartmentId) -> Result<(), Error> {
        let department = self
            .departments
            .find_by_id(&department_id)
            .await
            .map_err(map_department_repository_error)?;
        if department.is_none() {
            return Err(
                Error::reference_not_found(format!("department {department_id} not found"))
                    .with_details(field_details(
                        "departmentId",
                        Some(department_id.to_string()),
                        "department_not_found",
                    )),
            );
        }
        Ok(())
    }

    async fn create_employee(&self, draft: EmployeeDraft) -> Result<Employee, Error> {
        let validated = validate_draft(&draft)?;
        self.ensure_tax_id_free(&validated.tax_id, None).await?;
        if let Some(secondary_id) = validated.secondary_id.as_deref() {
            self.ensure_secondary_id_free(secondary_id, None).await?;
        }
        self.ensure_department_exists(validated.department_id).await?;

        let id = match draft.id {
            Some(requested) => {
                let taken = self
                    .employees
                    .find_by_id(&requested)
                    .await
                    .map_err(map_employee_repository_error)?;
                if taken.is_some() {
                    return Err(map_employee_repository_error(
                        EmployeeRepositoryError::duplicate_id(requested.to_string()),
                    ));
                }
                requested
            }
            None => EmployeeId::random(),
        };

        let now = self.clock.utc();
        let employee = Employee {
            id,
            name: validated.name,
            tax_id: validated.tax_id,
            secondary_id: validated.secondary_id,
            department_id: validated.department_id,
            created_at: now,
            updated_at: now,
        };
        self.employees
            .create(&employee)
            .await
            .map_err(map_employee_repository_error)?;
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: EmployeeId,
        draft: EmployeeDraft,
    ) -> Result<Employee, Error> {
        let existing = self.fetch(id).await?;
        let validated = validate_draft(&draft)?;
        if validated.tax_id != existing.tax_id {
            self.ensure_tax_id_free(&validated.tax_id, Some(id)).await?;
        }
        let changed_secondary_id = validated
            .secondary_id
            .as_deref()
            .filter(|candidate| existing.secondary_id.as_deref() != Some(*candidate));
        if let Some(secondary_id) = changed_secondary_id {
            self.ensure_secondary_id_free(secondary_id, Some(id)).await?;
        }
        self.ensure_department_exists(validated.department_id).await?;

        let employee = Employee {
            id,
            name: validated.name,
            tax_id: validated.tax_id,
            secondary_id: validated.secondary_id,
            department_id: validated.department_id,
            created_at: existing.created_at,
            updated_at: self.clock.utc(),
        };
        let replaced = self
            .employees
            .update(&employee)
            .await
            .map_err(map_employee_repository_error)?;
        if !replaced {
            return Err(not_found(id));
        }
        Ok(employee)
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<(), Error> {
        self.fetch(id).await?;
        let managed = self
            .departments
            .find_by_manager(&id)
            .await
            .map_err(map_department_repository_error)?;
        if let Some(department) = managed {
            return Err(Error::conflict(format!(
                "employee {id} manages department {}",
                department.id
            ))
            .with_details(field_details(
                "id",
                Some(id.to_string()),
                "manages_department",
            )));
        }

        let removed = self
            .employees
            .delete(&id)
            .await
            .map_err(map_employee_repository_error)?;
        if !removed {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl<E, D> EmployeeCommand for EmployeeService<E, D>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
{
    async fn create(&self, draft: EmployeeDraft) -> Result<Employee, Error> {
        let employee = self
            .create_employee(draft)
            .await
            .inspect_err(|err| log_rejection("employee.create", err))?;
        info!(employee = %employee.id, department = %employee.department_id, "employee created");
        Ok(employee)
    }

    async fn update(&self, id: EmployeeId, draft: EmployeeDraft) -> Result<Employee, Error> {
        let employee = self
            .update_employee(id, draft)
            .await
            .inspect_err(|err| log_rejection("employee.update", err))?;
        info!(employee = %employee.id, "employee updated");
        Ok(employee)
    }

    async fn delete(&self, id: EmployeeId) -> Result<(), Error> {
        self.delete_employee(id)
            .await
            .inspect_err(|err| log_rejection("employee.delete", err))?;
        info!(employee = %id, "employee deleted");
        Ok(())
    }
}

#[async_trait]
impl<E, D> EmployeeQuery for EmployeeService<E, D>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
{
    async fn get(&self, id: EmployeeId) -> Result<Employee, Error> {
        self.fetch(id).await
    }

    async fn list(
        &self,
        filter: EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, Error> {
        let filter = EmployeeFilter {
            name: non_blank(filter.name),
            tax_id: non_blank(filter.tax_id).map(|raw| tax_id::normalize(&raw)),
            secondary_id: non_blank(filter.secondary_id),
            department_id: filter.department_id,
        };
        self.employees
            .list(&filter, page)
            .await
            .map_err(map_employee_repository_error)
    }
}

#[cfg(test)]
#[path = "employee_service_tests.rs"]
mod tests;
