//! Port abstraction for department persistence adapters and their errors.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Department, DepartmentFilter, DepartmentId, EmployeeId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by department repository adapters.
    pub enum DepartmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "department repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "department repository query failed: {message}",
        /// Another department already uses the identifier.
        DuplicateId { id: String } => "department id {id} already exists",
        /// The manager already runs another department.
        ManagerAlreadyAssigned { manager_id: String } =>
            "employee {manager_id} already manages a department",
        /// The parent assignment would close a loop through the department.
        Cycle { department_id: String } =>
            "parent assignment for department {department_id} would create a cycle",
        /// A referenced manager or parent does not exist.
        MissingReference { message: String } => "department reference missing: {message}",
        /// Child departments or employees still reference the department.
        StillReferenced { message: String } => "department still referenced: {message}",
    }
}

/// Record store for departments.
///
/// `update` re-checks the ancestor chain of the written row atomically with
/// the write and fails with [`DepartmentRepositoryError::Cycle`] when a
/// concurrent writer would otherwise close a loop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Fetch a department by identifier.
    async fn find_by_id(
        &self,
        id: &DepartmentId,
    ) -> Result<Option<Department>, DepartmentRepositoryError>;

    /// Fetch the department managed by `manager_id`.
    async fn find_by_manager(
        &self,
        manager_id: &EmployeeId,
    ) -> Result<Option<Department>, DepartmentRepositoryError>;

    /// Total number of stored departments.
    async fn count(&self) -> Result<u64, DepartmentRepositoryError>;

    /// Direct children of `parent_id`, ordered by name then id.
    async fn list_by_parent(
        &self,
        parent_id: &DepartmentId,
    ) -> Result<Vec<Department>, DepartmentRepositoryError>;

    /// Direct children of any listed parent, ordered by name then id.
    async fn list_by_parents(
        &self,
        parent_ids: &[DepartmentId],
    ) -> Result<Vec<Department>, DepartmentRepositoryError>;

    /// Every department, ordered by name then id.
    async fn list_all(&self) -> Result<Vec<Department>, DepartmentRepositoryError>;

    /// Filtered page of departments ordered by name then id.
    async fn list(
        &self,
        filter: &DepartmentFilter,
        page: PageRequest,
    ) -> Result<Page<Department>, DepartmentRepositoryError>;

    /// Insert a new department.
    async fn create(&self, department: &Department) -> Result<(), DepartmentRepositoryError>;

    /// Replace a stored department. Returns `false` when no row matched.
    async fn update(&self, department: &Department) -> Result<bool, DepartmentRepositoryError>;

    /// Remove a department. Returns `false` when no row matched.
    async fn delete(&self, id: &DepartmentId) -> Result<bool, DepartmentRepositoryError>;
}
