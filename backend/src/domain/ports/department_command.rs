//! Driving port for department mutations.
//!
//! Every write passes through the hierarchy guard so the parent graph stays a
//! forest.

use async_trait::async_trait;

use crate::domain::{Department, DepartmentDraft, DepartmentId, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentCommand: Send + Sync {
    /// Validate and persist a new department.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the name is blank, or the manager is missing
    ///   and the store already holds a department.
    /// - `reference_not_found` when the manager or parent does not exist.
    /// - `conflict` when the manager already runs a department, the id is
    ///   taken, or the parent would close a cycle.
    async fn create(&self, draft: DepartmentDraft) -> Result<Department, Error>;

    /// Replace name, description, manager and parent of a department.
    async fn update(&self, id: DepartmentId, draft: DepartmentDraft)
    -> Result<Department, Error>;

    /// Remove a department that has no children and no employees.
    async fn delete(&self, id: DepartmentId) -> Result<(), Error>;
}
