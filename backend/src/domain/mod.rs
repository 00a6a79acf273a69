//! Domain primitives, services and ports.
//!
//! Purpose: hold the organisation hierarchy rules independent of transport
//! and storage. Entities live in [`employee`] and [`department`], the
//! integrity engine in [`hierarchy`], and the services that enforce the
//! invariants on every write in [`employee_service`] and
//! [`department_service`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Employee / Department and their drafts, filters and read models.
//! - TaxId: checksum-validated national identifier.
//! - EmployeeService / DepartmentService: driving port implementations.

pub mod department;
pub mod department_service;
pub mod employee;
pub mod employee_service;
pub mod error;
pub mod hierarchy;
pub mod ports;
mod service_support;
pub mod tax_id;
pub mod trace_id;

pub use self::department::{
    Department, DepartmentDraft, DepartmentFilter, DepartmentId, DepartmentTree, DepartmentView,
    ManagerClosure,
};
pub use self::department_service::DepartmentService;
pub use self::employee::{Employee, EmployeeDraft, EmployeeFilter, EmployeeId};
pub use self::employee_service::EmployeeService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::tax_id::{TaxId, TaxIdError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId, TraceIdError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use orgchart::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("no such employee"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
