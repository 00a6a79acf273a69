//! Employee data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DepartmentId, TaxId};

/// Stable employee identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(Uuid);

impl EmployeeId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for EmployeeId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Persisted employee record.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - `tax_id` is checksum-valid and unique across employees.
/// - `secondary_id`, when present, is non-blank and unique across employees.
/// - `department_id` references an existing department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub tax_id: TaxId,
    pub secondary_id: Option<String>,
    pub department_id: DepartmentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied employee fields for create and full-replacement update.
///
/// `tax_id` is kept raw so the service can report validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmployeeDraft {
    /// Requested identifier; ignored on update.
    pub id: Option<EmployeeId>,
    pub name: String,
    pub tax_id: String,
    pub secondary_id: Option<String>,
    pub department_id: Option<DepartmentId>,
}

impl EmployeeDraft {
    /// Trimmed secondary identifier, with blank values treated as absent.
    pub fn normalized_secondary_id(&self) -> Option<String> {
        self.secondary_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }
}

/// Filters accepted by employee listings. Absent fields do not filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmployeeFilter {
    /// Case-insensitive partial match on the name.
    pub name: Option<String>,
    /// Exact match on the normalised tax id.
    pub tax_id: Option<String>,
    /// Exact match on the secondary id.
    pub secondary_id: Option<String>,
    /// Exact match on the department.
    pub department_id: Option<DepartmentId>,
}

impl EmployeeFilter {
    /// Whether `employee` satisfies every populated filter.
    pub fn matches(&self, employee: &Employee) -> bool {
        let name_matches = self.name.as_deref().is_none_or(|needle| {
            employee
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let tax_id_matches = self
            .tax_id
            .as_deref()
            .is_none_or(|tax_id| employee.tax_id.as_str() == tax_id);
        let secondary_matches = self
            .secondary_id
            .as_deref()
            .is_none_or(|secondary| employee.secondary_id.as_deref() == Some(secondary));
        let department_matches = self
            .department_id
            .is_none_or(|department_id| employee.department_id == department_id);
        name_matches && tax_id_matches && secondary_matches && department_matches
    }
}
