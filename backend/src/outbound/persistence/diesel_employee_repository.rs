//! PostgreSQL-backed `EmployeeRepository` implementation using Diesel ORM.
//!
//! Uniqueness of tax ids and secondary ids is enforced by the schema, so a
//! racing insert surfaces as a typed duplicate error rather than a second row.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{EmployeeRepository, EmployeeRepositoryError};
use crate::domain::{DepartmentId, Employee, EmployeeFilter, EmployeeId, TaxId};

use super::diesel_error_mapping::{
    EMPLOYEES_PKEY, EMPLOYEES_SECONDARY_ID_KEY, EMPLOYEES_TAX_ID_KEY, StoreFailure, classify,
    contains_pattern, to_count, to_offset,
};
use super::models::{EmployeeChanges, EmployeeRow};
use super::pool::{DbPool, PoolError};
use super::schema::employees;

/// Diesel-backed implementation of the `EmployeeRepository` port.
#[derive(Clone)]
pub struct DieselEmployeeRepository {
    pool: DbPool,
}

impl DieselEmployeeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EmployeeRepositoryError {
    EmployeeRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> EmployeeRepositoryError {
    map_failure(classify(error), None)
}

/// Translate a write failure, naming the offending value where known.
fn map_failure(failure: StoreFailure, employee: Option<&Employee>) -> EmployeeRepositoryError {
    if let (StoreFailure::Unique { .. }, Some(employee)) = (&failure, employee) {
        if failure.is_constraint(EMPLOYEES_TAX_ID_KEY) {
            return EmployeeRepositoryError::duplicate_tax_id(employee.tax_id.as_str());
        }
        if failure.is_constraint(EMPLOYEES_SECONDARY_ID_KEY) {
            return EmployeeRepositoryError::duplicate_secondary_id(
                employee.secondary_id.clone().unwrap_or_default(),
            );
        }
        if failure.is_constraint(EMPLOYEES_PKEY) {
            return EmployeeRepositoryError::duplicate_id(employee.id.to_string());
        }
    }
    match failure {
        StoreFailure::Connection(message) => EmployeeRepositoryError::connection(message),
        StoreFailure::ForeignKey { .. } => match employee {
            Some(employee) => EmployeeRepositoryError::missing_reference(format!(
                "department {} does not exist",
                employee.department_id
            )),
            None => EmployeeRepositoryError::still_referenced("employee manages a department"),
        },
        other => EmployeeRepositoryError::query(other.describe()),
    }
}

fn row_to_employee(row: EmployeeRow) -> Result<Employee, EmployeeRepositoryError> {
    Employee::try_from(row).map_err(EmployeeRepositoryError::query)
}

fn rows_to_employees(rows: Vec<EmployeeRow>) -> Result<Vec<Employee>, EmployeeRepositoryError> {
    rows.into_iter().map(row_to_employee).collect()
}

/// Base query with every filter criterion applied.
fn filtered(filter: &EmployeeFilter) -> employees::BoxedQuery<'static, Pg> {
    let mut query = employees::table.into_boxed();
    if let Some(name) = filter.name.as_deref() {
        query = query.filter(employees::name.ilike(contains_pattern(name)));
    }
    if let Some(tax_id) = filter.tax_id.clone() {
        query = query.filter(employees::tax_id.eq(tax_id));
    }
    if let Some(secondary_id) = filter.secondary_id.clone() {
        query = query.filter(employees::secondary_id.eq(secondary_id));
    }
    if let Some(department_id) = filter.department_id {
        query = query.filter(employees::department_id.eq(*department_id.as_uuid()));
    }
    query
}

#[async_trait]
impl EmployeeRepository for DieselEmployeeRepository {
    async fn find_by_id(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        employees::table
            .find(*id.as_uuid())
            .select(EmployeeRow::as_select())
            .first::<EmployeeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_employee)
            .transpose()
    }

    async fn find_by_tax_id(
        &self,
        tax_id: &TaxId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        employees::table
            .filter(employees::tax_id.eq(tax_id.as_str()))
            .select(EmployeeRow::as_select())
            .first::<EmployeeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_employee)
            .transpose()
    }

    async fn find_by_secondary_id(
        &self,
        secondary_id: &str,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        employees::table
            .filter(employees::secondary_id.eq(secondary_id))
            .select(EmployeeRow::as_select())
            .first::<EmployeeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_employee)
            .transpose()
    }

    async fn list_by_departments(
        &self,
        department_ids: &[DepartmentId],
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        if department_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = department_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .filter(employees::department_id.eq_any(ids))
            .select(EmployeeRow::as_select())
            .order((employees::name.asc(), employees::id.asc()))
            .load::<EmployeeRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn count_in_department(
        &self,
        department_id: &DepartmentId,
    ) -> Result<u64, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total = employees::table
            .filter(employees::department_id.eq(*department_id.as_uuid()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_count(total))
    }

    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = filtered(filter)
            .select(EmployeeRow::as_select())
            .order((employees::name.asc(), employees::id.asc()))
            .limit(i64::from(page.limit()))
            .offset(to_offset(page.offset()))
            .load::<EmployeeRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(rows_to_employees(rows)?, to_count(total), page))
    }

    async fn create(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(employees::table)
            .values(EmployeeRow::from(employee))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), Some(employee)))?;
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(employees::table.find(*employee.id.as_uuid()))
            .set(EmployeeChanges::from(employee))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), Some(employee)))?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<bool, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(employees::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
