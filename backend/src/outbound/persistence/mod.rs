//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; every database failure is mapped onto the typed
//! port errors.
//!
//! ```ignore
//! use orgchart::outbound::persistence::{DbPool, DieselEmployeeRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/orgchart")).await?;
//! let employees = DieselEmployeeRepository::new(pool);
//! ```

mod diesel_department_repository;
mod diesel_employee_repository;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_department_repository::DieselDepartmentRepository;
pub use diesel_employee_repository::DieselEmployeeRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
