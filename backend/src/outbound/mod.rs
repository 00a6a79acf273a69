//! Outbound adapters implementing the repository ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local store for development and tests
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules beyond the constraints the schema declares.

pub mod memory;
pub mod persistence;
