//! Driving port for employee mutations.
//!
//! HTTP handlers call [`EmployeeCommand`] to create, replace and remove
//! employees. Implementations validate drafts and translate store constraint
//! violations into domain errors.

use async_trait::async_trait;

use crate::domain::{Employee, EmployeeDraft, EmployeeId, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeCommand: Send + Sync {
    /// Validate and persist a new employee.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the name is blank, the tax id fails its
    ///   checksum, or no department is given.
    /// - `conflict` when the id, tax id or secondary id is already taken.
    /// - `reference_not_found` when the department does not exist.
    async fn create(&self, draft: EmployeeDraft) -> Result<Employee, Error>;

    /// Replace every mutable field of an existing employee.
    async fn update(&self, id: EmployeeId, draft: EmployeeDraft) -> Result<Employee, Error>;

    /// Remove an employee who manages no department.
    async fn delete(&self, id: EmployeeId) -> Result<(), Error>;
}
