//! Hierarchy integrity engine.
//!
//! [`guard`] rejects parent assignments that would make the department graph
//! cyclic. [`closure`] walks the reverse parent relation breadth first to
//! collect a subtree and the employees inside it.

pub mod closure;
pub mod guard;

pub use closure::{ClosureError, collect_subtree, resolve_manager_closure};
pub use guard::{GuardError, would_create_cycle};

#[cfg(test)]
mod tests;
