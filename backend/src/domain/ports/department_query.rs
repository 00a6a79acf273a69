//! Driving port for department reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Department, DepartmentFilter, DepartmentId, DepartmentTree, DepartmentView, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentQuery: Send + Sync {
    /// Every department, ordered by name.
    async fn get_all(&self) -> Result<Vec<Department>, Error>;

    /// One department with its manager resolved.
    async fn get_by_id(&self, id: DepartmentId) -> Result<DepartmentView, Error>;

    /// Filtered, paginated search with the total matching count.
    async fn search(
        &self,
        filter: DepartmentFilter,
        page: PageRequest,
    ) -> Result<Page<Department>, Error>;

    /// The department and all of its descendants, nested by parent.
    async fn hierarchy(&self, id: DepartmentId) -> Result<DepartmentTree, Error>;
}
