//! Breadth-first closure over the reverse parent relation.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, error, warn};

use crate::domain::ports::{
    DepartmentRepository, DepartmentRepositoryError, EmployeeRepository, EmployeeRepositoryError,
};
use crate::domain::{Department, EmployeeId, ManagerClosure};

/// Failures while resolving a closure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClosureError {
    /// No department names the employee as manager.
    #[error("employee {manager_id} manages no department")]
    ManagerNotFound { manager_id: EmployeeId },
    /// The deadline passed before the walk finished.
    #[error("hierarchy walk exceeded its deadline")]
    DeadlineExceeded,
    /// The walk collected more departments than the store holds.
    #[error("subtree walk collected {collected} departments but the store holds {limit}")]
    InternalInconsistency { collected: u64, limit: u64 },
    /// The department store failed.
    #[error(transparent)]
    Departments(#[from] DepartmentRepositoryError),
    /// The employee store failed.
    #[error(transparent)]
    Employees(#[from] EmployeeRepositoryError),
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), ClosureError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(ClosureError::DeadlineExceeded),
        _ => Ok(()),
    }
}

/// Collect `root` and every descendant in breadth-first discovery order.
///
/// Each level costs one `list_by_parents` call. Departments already seen are
/// skipped, and the result may not outgrow the department count.
pub async fn collect_subtree<D>(
    departments: &D,
    root: Department,
    deadline: Option<Instant>,
) -> Result<Vec<Department>, ClosureError>
where
    D: DepartmentRepository + ?Sized,
{
    let limit = departments.count().await?;
    let mut visited = HashSet::from([root.id]);
    let mut frontier = vec![root.id];
    let mut collected = vec![root];

    while !frontier.is_empty() {
        check_deadline(deadline)?;
        let children = departments.list_by_parents(&frontier).await?;
        frontier = Vec::with_capacity(children.len());
        for child in children {
            if !visited.insert(child.id) {
                warn!(department = %child.id, "department reached twice during subtree walk");
                continue;
            }
            frontier.push(child.id);
            collected.push(child);
        }

        let size = u64::try_from(collected.len()).unwrap_or(u64::MAX);
        if size > limit {
            error!(collected = size, limit, "subtree walk outgrew the department store");
            return Err(ClosureError::InternalInconsistency {
                collected: size,
                limit,
            });
        }
    }

    Ok(collected)
}

/// Resolve the departments under `manager_id` and the employees inside them.
pub async fn resolve_manager_closure<D, E>(
    departments: &D,
    employees: &E,
    manager_id: EmployeeId,
    deadline: Option<Instant>,
) -> Result<ManagerClosure, ClosureError>
where
    D: DepartmentRepository + ?Sized,
    E: EmployeeRepository + ?Sized,
{
    let root = departments
        .find_by_manager(&manager_id)
        .await?
        .ok_or(ClosureError::ManagerNotFound { manager_id })?;

    let collected = collect_subtree(departments, root, deadline).await?;
    check_deadline(deadline)?;

    let ids: Vec<_> = collected.iter().map(|department| department.id).collect();
    let members = employees.list_by_departments(&ids).await?;
    debug!(
        %manager_id,
        departments = collected.len(),
        employees = members.len(),
        "resolved manager closure"
    );

    Ok(ManagerClosure {
        manager_id,
        departments: collected,
        employees: members,
    })
}
