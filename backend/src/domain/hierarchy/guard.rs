//! Cycle guard for department parent edges.

use tracing::error;

use crate::domain::DepartmentId;
use crate::domain::ports::{DepartmentRepository, DepartmentRepositoryError};

/// Reasons the guard could not reach a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// A department on the ancestor chain does not exist.
    #[error("department {id} not found")]
    ReferenceNotFound { id: DepartmentId },
    /// The ancestor chain is longer than the store, so it already loops.
    #[error("ancestor chain of department {start} exceeds {limit} steps")]
    InternalInconsistency { start: DepartmentId, limit: u64 },
    /// The record store failed.
    #[error(transparent)]
    Store(#[from] DepartmentRepositoryError),
}

/// Decide whether making `proposed_parent` the parent of `subject` would
/// close a loop.
///
/// Walks up from `proposed_parent` until it reaches `subject` (cycle), a root
/// (no cycle) or a missing department. The walk takes at most
/// `count + 1` steps, where `count` is the number of stored departments.
pub async fn would_create_cycle<R>(
    repo: &R,
    subject: DepartmentId,
    proposed_parent: DepartmentId,
) -> Result<bool, GuardError>
where
    R: DepartmentRepository + ?Sized,
{
    let limit = repo.count().await?.saturating_add(1);
    let mut current = proposed_parent;
    let mut steps: u64 = 0;

    loop {
        if steps >= limit {
            error!(
                %subject,
                %proposed_parent,
                limit,
                "department ancestor chain does not terminate"
            );
            return Err(GuardError::InternalInconsistency {
                start: proposed_parent,
                limit,
            });
        }
        steps += 1;

        let Some(department) = repo.find_by_id(&current).await? else {
            return Err(GuardError::ReferenceNotFound { id: current });
        };
        if department.id == subject {
            return Ok(true);
        }
        match department.parent_id {
            Some(parent) => current = parent,
            None => return Ok(false),
        }
    }
}
