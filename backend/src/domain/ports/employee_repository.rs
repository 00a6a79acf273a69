//! Port abstraction for employee persistence adapters and their errors.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{DepartmentId, Employee, EmployeeFilter, EmployeeId, TaxId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by employee repository adapters.
    pub enum EmployeeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "employee repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "employee repository query failed: {message}",
        /// Another employee already uses the identifier.
        DuplicateId { id: String } => "employee id {id} already exists",
        /// Another employee already holds the tax id.
        DuplicateTaxId { tax_id: String } => "tax id {tax_id} already registered",
        /// Another employee already holds the secondary id.
        DuplicateSecondaryId { secondary_id: String } =>
            "secondary id {secondary_id} already registered",
        /// The referenced department does not exist.
        MissingReference { message: String } => "employee reference missing: {message}",
        /// The employee is still referenced as a department manager.
        StillReferenced { message: String } => "employee still referenced: {message}",
    }
}

/// Record store for employees.
///
/// Adapters enforce tax id and secondary id uniqueness atomically with the
/// write and report violations through the typed error variants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Fetch an employee by identifier.
    async fn find_by_id(&self, id: &EmployeeId)
    -> Result<Option<Employee>, EmployeeRepositoryError>;

    /// Fetch the employee holding `tax_id`.
    async fn find_by_tax_id(
        &self,
        tax_id: &TaxId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError>;

    /// Fetch the employee holding `secondary_id`.
    async fn find_by_secondary_id(
        &self,
        secondary_id: &str,
    ) -> Result<Option<Employee>, EmployeeRepositoryError>;

    /// Employees of any listed department, ordered by name then id.
    async fn list_by_departments(
        &self,
        department_ids: &[DepartmentId],
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Number of employees assigned to `department_id`.
    async fn count_in_department(
        &self,
        department_id: &DepartmentId,
    ) -> Result<u64, EmployeeRepositoryError>;

    /// Filtered page of employees ordered by name then id.
    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, EmployeeRepositoryError>;

    /// Insert a new employee.
    async fn create(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError>;

    /// Replace a stored employee. Returns `false` when no row matched.
    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError>;

    /// Remove an employee. Returns `false` when no row matched.
    async fn delete(&self, id: &EmployeeId) -> Result<bool, EmployeeRepositoryError>;
}
