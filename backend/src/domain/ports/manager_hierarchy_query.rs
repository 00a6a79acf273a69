//! Driving port for the manager closure query.

use std::time::Instant;

use async_trait::async_trait;

use crate::domain::{EmployeeId, Error, ManagerClosure};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManagerHierarchyQuery: Send + Sync {
    /// Departments under the one `manager_id` runs, and their employees.
    ///
    /// # Errors
    ///
    /// - `not_found` when the employee manages no department.
    /// - `deadline_exceeded` when `deadline` passes before the walk ends.
    /// - `internal_inconsistency` when the stored tree is corrupt.
    async fn employees_under(
        &self,
        manager_id: EmployeeId,
        deadline: Option<Instant>,
    ) -> Result<ManagerClosure, Error>;
}
