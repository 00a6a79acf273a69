//! Department domain service.
//!
//! Implements [`DepartmentCommand`], [`DepartmentQuery`] and
//! [`ManagerHierarchyQuery`]. Every parent assignment passes through the
//! hierarchy guard before reaching the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use crate::domain::hierarchy::{collect_subtree, resolve_manager_closure, would_create_cycle};
use crate::domain::ports::{
    DepartmentCommand, DepartmentQuery, DepartmentRepository, DepartmentRepositoryError,
    EmployeeRepository, ManagerHierarchyQuery,
};
use crate::domain::service_support::{
    cycle, field_details, log_rejection, manager_taken, map_closure_error,
    map_department_repository_error, map_employee_repository_error, map_guard_error, non_blank,
    require_name,
};
use crate::domain::{
    Department, DepartmentDraft, DepartmentFilter, DepartmentId, DepartmentTree, DepartmentView,
    EmployeeId, Error, ManagerClosure,
};

/// Department service implementing the department driving ports.
#[derive(Clone)]
pub struct DepartmentService<D, E> {
    departments: Arc<D>,
    employees: Arc<E>,
    clock: Arc<dyn Clock>,
    walk_timeout: Option<Duration>,
}

impl<D, E> DepartmentService<D, E> {
    /// Create a service over the department and employee stores.
    pub fn new(departments: Arc<D>, employees: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            departments,
            employees,
            clock,
            walk_timeout: None,
        }
    }

    /// Bound subtree walks started by [`DepartmentQuery::hierarchy`].
    #[must_use]
    pub fn with_walk_timeout(mut self, timeout: Duration) -> Self {
        self.walk_timeout = Some(timeout);
        self
    }

    fn walk_deadline(&self) -> Option<Instant> {
        self.walk_timeout
            .and_then(|timeout| Instant::now().checked_add(timeout))
    }
}

fn not_found(id: DepartmentId) -> Error {
    Error::not_found(format!("department {id} not found"))
}

/// Whether a department without a manager is acceptable.
enum ManagerRule {
    Required,
    Optional,
}

impl<D, E> DepartmentService<D, E>
where
    D: DepartmentRepository,
    E: EmployeeRepository,
{
    async fn fetch(&self, id: DepartmentId) -> Result<Department, Error> {
        self.departments
            .find_by_id(&id)
            .await
            .map_err(map_department_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Check the manager exists and runs no department other than `subject`.
    async fn check_manager(
        &self,
        manager_id: Option<EmployeeId>,
        rule: ManagerRule,
        subject: DepartmentId,
    ) -> Result<(), Error> {
        let Some(manager_id) = manager_id else {
            return match rule {
                ManagerRule::Optional => Ok(()),
                ManagerRule::Required => Err(Error::invalid_request(
                    "managerId is required once a department exists",
                )
                .with_details(field_details("managerId", None, "manager_required"))),
            };
        };

        let manager = self
            .employees
            .find_by_id(&manager_id)
            .await
            .map_err(map_employee_repository_error)?;
        if manager.is_none() {
            return Err(
                Error::reference_not_found(format!("employee {manager_id} not found"))
                    .with_details(field_details(
                        "managerId",
                        Some(manager_id.to_string()),
                        "manager_not_found",
                    )),
            );
        }

        let managed = self
            .departments
            .find_by_manager(&manager_id)
            .await
            .map_err(map_department_repository_error)?;
        match managed {
            Some(other) if other.id != subject => Err(manager_taken(manager_id.to_string())),
            _ => Ok(()),
        }
    }

    /// Run the cycle guard for a proposed parent of `subject`.
    async fn check_parent(
        &self,
        subject: DepartmentId,
        parent_id: Option<DepartmentId>,
    ) -> Result<(), Error> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        let closes_loop = would_create_cycle(self.departments.as_ref(), subject, parent_id)
            .await
            .map_err(map_guard_error)?;
        if closes_loop {
            return Err(cycle(subject.to_string()));
        }
        Ok(())
    }

    async fn create_department(&self, draft: DepartmentDraft) -> Result<Department, Error> {
        let name = require_name(&draft.name)?;
        let stored = self
            .departments
            .count()
            .await
            .map_err(map_department_repository_error)?;
        let rule = if stored == 0 {
            ManagerRule::Optional
        } else {
            ManagerRule::Required
        };
        let id = draft.id.unwrap_or_else(DepartmentId::random);

        self.check_manager(draft.manager_id, rule, id).await?;
        self.check_parent(id, draft.parent_id).await?;
        if draft.id.is_some() {
            let taken = self
                .departments
                .find_by_id(&id)
                .await
                .map_err(map_department_repository_error)?;
            if taken.is_some() {
                return Err(map_department_repository_error(
                    DepartmentRepositoryError::duplicate_id(id.to_string()),
                ));
            }
        }

        let now = self.clock.utc();
        let department = Department {
            id,
            name,
            description: non_blank(draft.description),
            manager_id: draft.manager_id,
            parent_id: draft.parent_id,
            created_at: now,
            updated_at: now,
        };
        self.departments
            .create(&department)
            .await
            .map_err(map_department_repository_error)?;
        Ok(department)
    }

    async fn update_department(
        &self,
        id: DepartmentId,
        draft: DepartmentDraft,
    ) -> Result<Department, Error> {
        let existing = self.fetch(id).await?;
        let name = require_name(&draft.name)?;
        // A department bootstrapped without a manager may stay unmanaged.
        let rule = if existing.manager_id.is_none() {
            ManagerRule::Optional
        } else {
            ManagerRule::Required
        };
        self.check_manager(draft.manager_id, rule, id).await?;
        self.check_parent(id, draft.parent_id).await?;

        let department = Department {
            id,
            name,
            description: non_blank(draft.description),
            manager_id: draft.manager_id,
            parent_id: draft.parent_id,
            created_at: existing.created_at,
            updated_at: self.clock.utc(),
        };
        let replaced = self
            .departments
            .update(&department)
            .await
            .map_err(map_department_repository_error)?;
        if !replaced {
            return Err(not_found(id));
        }
        Ok(department)
    }

    async fn delete_department(&self, id: DepartmentId) -> Result<(), Error> {
        self.fetch(id).await?;
        let children = self
            .departments
            .list_by_parent(&id)
            .await
            .map_err(map_department_repository_error)?;
        if !children.is_empty() {
            return Err(Error::conflict(format!(
                "department {id} still has {} child departments",
                children.len()
            ))
            .with_details(field_details("id", Some(id.to_string()), "has_children")));
        }
        let members = self
            .employees
            .count_in_department(&id)
            .await
            .map_err(map_employee_repository_error)?;
        if members > 0 {
            return Err(
                Error::conflict(format!("department {id} still has {members} employees"))
                    .with_details(field_details("id", Some(id.to_string()), "has_employees")),
            );
        }

        let removed = self
            .departments
            .delete(&id)
            .await
            .map_err(map_department_repository_error)?;
        if !removed {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl<D, E> DepartmentCommand for DepartmentService<D, E>
where
    D: DepartmentRepository,
    E: EmployeeRepository,
{
    async fn create(&self, draft: DepartmentDraft) -> Result<Department, Error> {
        let department = self
            .create_department(draft)
            .await
            .inspect_err(|err| log_rejection("department.create", err))?;
        info!(department = %department.id, "department created");
        Ok(department)
    }

    async fn update(
        &self,
        id: DepartmentId,
        draft: DepartmentDraft,
    ) -> Result<Department, Error> {
        let department = self
            .update_department(id, draft)
            .await
            .inspect_err(|err| log_rejection("department.update", err))?;
        info!(department = %department.id, "department updated");
        Ok(department)
    }

    async fn delete(&self, id: DepartmentId) -> Result<(), Error> {
        self.delete_department(id)
            .await
            .inspect_err(|err| log_rejection("department.delete", err))?;
        info!(department = %id, "department deleted");
        Ok(())
    }
}

#[async_trait]
impl<D, E> DepartmentQuery for DepartmentService<D, E>
where
    D: DepartmentRepository,
    E: EmployeeRepository,
{
    async fn get_all(&self) -> Result<Vec<Department>, Error> {
        self.departments
            .list_all()
            .await
            .map_err(map_department_repository_error)
    }

    async fn get_by_id(&self, id: DepartmentId) -> Result<DepartmentView, Error> {
        let department = self.fetch(id).await?;
        let manager = match department.manager_id {
            Some(manager_id) => {
                let manager = self
                    .employees
                    .find_by_id(&manager_id)
                    .await
                    .map_err(map_employee_repository_error)?;
                if manager.is_none() {
                    warn!(department = %id, manager = %manager_id, "manager reference dangles");
                }
                manager
            }
            None => None,
        };
        Ok(DepartmentView {
            department,
            manager,
        })
    }

    async fn search(
        &self,
        filter: DepartmentFilter,
        page: PageRequest,
    ) -> Result<Page<Department>, Error> {
        let filter = DepartmentFilter {
            name: non_blank(filter.name),
            parent_id: filter.parent_id,
        };
        self.departments
            .list(&filter, page)
            .await
            .map_err(map_department_repository_error)
    }

    async fn hierarchy(&self, id: DepartmentId) -> Result<DepartmentTree, Error> {
        let root = self.fetch(id).await?;
        let collected = collect_subtree(self.departments.as_ref(), root, self.walk_deadline())
            .await
            .map_err(map_closure_error)?;
        DepartmentTree::assemble(collected)
            .ok_or_else(|| Error::internal("subtree walk returned no departments"))
    }
}

#[async_trait]
impl<D, E> ManagerHierarchyQuery for DepartmentService<D, E>
where
    D: DepartmentRepository,
    E: EmployeeRepository,
{
    async fn employees_under(
        &self,
        manager_id: EmployeeId,
        deadline: Option<Instant>,
    ) -> Result<ManagerClosure, Error> {
        resolve_manager_closure(
            self.departments.as_ref(),
            self.employees.as_ref(),
            manager_id,
            deadline.or_else(|| self.walk_deadline()),
        )
        .await
        .map_err(map_closure_error)
    }
}

#[cfg(test)]
#[path = "department_service_tests.rs"]
mod tests;
