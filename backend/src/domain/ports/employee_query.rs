//! Driving port for employee reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Employee, EmployeeFilter, EmployeeId, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeQuery: Send + Sync {
    /// Fetch one employee, failing with `not_found` when absent.
    async fn get(&self, id: EmployeeId) -> Result<Employee, Error>;

    /// Filtered, paginated listing with the total matching count.
    async fn list(&self, filter: EmployeeFilter, page: PageRequest)
    -> Result<Page<Employee>, Error>;
}
