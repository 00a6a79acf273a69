//! Internal helpers shared by the employee and department services.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::hierarchy::{ClosureError, GuardError};
use crate::domain::ports::{DepartmentRepositoryError, EmployeeRepositoryError};
use crate::domain::{Error, ErrorCode};

/// Details payload naming the offending field.
pub(crate) fn field_details(field: &str, value: Option<String>, code: &str) -> Value {
    match value {
        Some(value) => json!({ "field": field, "value": value, "code": code }),
        None => json!({ "field": field, "code": code }),
    }
}

/// Reject a blank name, returning the trimmed value otherwise.
pub(crate) fn require_name(raw: &str) -> Result<String, Error> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::invalid_request("name must not be empty")
            .with_details(field_details("name", None, "empty_name")));
    }
    Ok(name.to_owned())
}

/// Trim an optional filter value, treating blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

pub(crate) fn log_rejection(operation: &'static str, error: &Error) {
    match error.code() {
        ErrorCode::Conflict => warn!(operation, message = error.message(), "write rejected"),
        ErrorCode::InvalidRequest | ErrorCode::ReferenceNotFound | ErrorCode::NotFound => {
            debug!(operation, message = error.message(), "write rejected");
        }
        _ => {}
    }
}

pub(crate) fn map_employee_repository_error(error: EmployeeRepositoryError) -> Error {
    match error {
        EmployeeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("employee repository unavailable: {message}"))
        }
        EmployeeRepositoryError::Query { message } => {
            Error::internal(format!("employee repository error: {message}"))
        }
        EmployeeRepositoryError::DuplicateId { id } => {
            Error::conflict(format!("employee id {id} already exists"))
                .with_details(field_details("id", Some(id), "duplicate_id"))
        }
        EmployeeRepositoryError::DuplicateTaxId { tax_id } => {
            Error::conflict("tax id already registered")
                .with_details(field_details("taxId", Some(tax_id), "duplicate_tax_id"))
        }
        EmployeeRepositoryError::DuplicateSecondaryId { secondary_id } => {
            Error::conflict("secondary id already registered").with_details(field_details(
                "secondaryId",
                Some(secondary_id),
                "duplicate_secondary_id",
            ))
        }
        EmployeeRepositoryError::MissingReference { message } => {
            Error::reference_not_found(format!("department not found: {message}"))
                .with_details(field_details("departmentId", None, "department_not_found"))
        }
        EmployeeRepositoryError::StillReferenced { message } => {
            Error::conflict(format!("employee still manages a department: {message}"))
        }
    }
}

pub(crate) fn map_department_repository_error(error: DepartmentRepositoryError) -> Error {
    match error {
        DepartmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("department repository unavailable: {message}"))
        }
        DepartmentRepositoryError::Query { message } => {
            Error::internal(format!("department repository error: {message}"))
        }
        DepartmentRepositoryError::DuplicateId { id } => {
            Error::conflict(format!("department id {id} already exists"))
                .with_details(field_details("id", Some(id), "duplicate_id"))
        }
        DepartmentRepositoryError::ManagerAlreadyAssigned { manager_id } => {
            manager_taken(manager_id)
        }
        DepartmentRepositoryError::Cycle { department_id } => cycle(department_id),
        DepartmentRepositoryError::MissingReference { message } => {
            Error::reference_not_found(format!("referenced record not found: {message}"))
        }
        DepartmentRepositoryError::StillReferenced { message } => {
            Error::conflict(format!("department still referenced: {message}"))
        }
    }
}

pub(crate) fn manager_taken(manager_id: String) -> Error {
    Error::conflict("employee already manages a department").with_details(field_details(
        "managerId",
        Some(manager_id),
        "manager_already_assigned",
    ))
}

pub(crate) fn cycle(department_id: String) -> Error {
    Error::conflict("parent assignment would create a cycle").with_details(field_details(
        "parentDepartmentId",
        Some(department_id),
        "cycle",
    ))
}

pub(crate) fn map_guard_error(error: GuardError) -> Error {
    match error {
        GuardError::ReferenceNotFound { id } => {
            Error::reference_not_found(format!("department {id} not found")).with_details(
                field_details("parentDepartmentId", Some(id.to_string()), "parent_not_found"),
            )
        }
        GuardError::InternalInconsistency { .. } => {
            Error::internal_inconsistency(error.to_string())
        }
        GuardError::Store(error) => map_department_repository_error(error),
    }
}

pub(crate) fn map_closure_error(error: ClosureError) -> Error {
    match error {
        ClosureError::ManagerNotFound { .. } => Error::not_found(error.to_string()),
        ClosureError::DeadlineExceeded => Error::deadline_exceeded(error.to_string()),
        ClosureError::InternalInconsistency { .. } => {
            Error::internal_inconsistency(error.to_string())
        }
        ClosureError::Departments(error) => map_department_repository_error(error),
        ClosureError::Employees(error) => map_employee_repository_error(error),
    }
}
