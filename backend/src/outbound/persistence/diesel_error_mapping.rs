//! Classification of Diesel failures shared by the repositories.
//!
//! Constraint names come from `backend/migrations`; keep both in step.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

pub(crate) const EMPLOYEES_PKEY: &str = "employees_pkey";
pub(crate) const EMPLOYEES_TAX_ID_KEY: &str = "employees_tax_id_key";
pub(crate) const EMPLOYEES_SECONDARY_ID_KEY: &str = "employees_secondary_id_key";
pub(crate) const DEPARTMENTS_PKEY: &str = "departments_pkey";
pub(crate) const DEPARTMENTS_MANAGER_ID_KEY: &str = "departments_manager_id_key";
pub(crate) const DEPARTMENTS_NOT_OWN_PARENT: &str = "departments_not_own_parent";

/// Storage failure reduced to what the repositories act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The connection dropped mid-operation.
    Connection(String),
    /// A unique constraint rejected the write.
    Unique { constraint: Option<String> },
    /// A foreign key rejected the write or delete.
    ForeignKey { constraint: Option<String> },
    /// A check constraint rejected the write.
    Check { constraint: Option<String> },
    /// A serializable transaction lost a race.
    Serialization,
    /// Anything else.
    Query(String),
}

/// Reduce a Diesel error to a [`StoreFailure`].
pub(crate) fn classify(error: DieselError) -> StoreFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => StoreFailure::Unique { constraint },
                DatabaseErrorKind::ForeignKeyViolation => StoreFailure::ForeignKey { constraint },
                DatabaseErrorKind::CheckViolation => StoreFailure::Check { constraint },
                DatabaseErrorKind::SerializationFailure => StoreFailure::Serialization,
                DatabaseErrorKind::ClosedConnection => {
                    StoreFailure::Connection("database connection closed".to_owned())
                }
                _ => StoreFailure::Query(info.message().to_owned()),
            }
        }
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        other => {
            debug!(error = %other, "diesel operation failed");
            StoreFailure::Query("database error".to_owned())
        }
    }
}

impl StoreFailure {
    /// Whether the failure names `constraint`.
    pub(crate) fn is_constraint(&self, name: &str) -> bool {
        match self {
            Self::Unique { constraint }
            | Self::ForeignKey { constraint }
            | Self::Check { constraint } => constraint.as_deref() == Some(name),
            _ => false,
        }
    }

    /// Human-readable description used in query error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message.clone(),
            Self::Unique { constraint } => {
                format!("unique constraint {} violated", constraint_label(constraint))
            }
            Self::ForeignKey { constraint } => {
                format!("foreign key {} violated", constraint_label(constraint))
            }
            Self::Check { constraint } => {
                format!("check constraint {} violated", constraint_label(constraint))
            }
            Self::Serialization => "serializable transaction aborted".to_owned(),
        }
    }
}

fn constraint_label(constraint: &Option<String>) -> &str {
    constraint.as_deref().unwrap_or("<unnamed>")
}

/// Convert a count column into `u64`; counts are never negative.
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Convert a page offset into the `i64` Diesel binds.
pub(crate) fn to_offset(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
