//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Department, DepartmentId, Employee, EmployeeId, TaxId};

use super::schema::{departments, employees};

/// Row struct for reading from and inserting into the departments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DepartmentRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of the mutable department columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = departments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DepartmentChanges<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub manager_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Department> for DepartmentRow {
    fn from(department: &Department) -> Self {
        Self {
            id: *department.id.as_uuid(),
            name: department.name.clone(),
            description: department.description.clone(),
            manager_id: department.manager_id.map(|id| *id.as_uuid()),
            parent_id: department.parent_id.map(|id| *id.as_uuid()),
            created_at: department.created_at,
            updated_at: department.updated_at,
        }
    }
}

impl<'a> From<&'a Department> for DepartmentChanges<'a> {
    fn from(department: &'a Department) -> Self {
        Self {
            name: department.name.as_str(),
            description: department.description.as_deref(),
            manager_id: department.manager_id.map(|id| *id.as_uuid()),
            parent_id: department.parent_id.map(|id| *id.as_uuid()),
            updated_at: department.updated_at,
        }
    }
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Self {
            id: DepartmentId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            manager_id: row.manager_id.map(EmployeeId::from_uuid),
            parent_id: row.parent_id.map(DepartmentId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row struct for reading from and inserting into the employees table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EmployeeRow {
    pub id: Uuid,
    pub name: String,
    pub tax_id: String,
    pub secondary_id: Option<String>,
    pub department_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of the mutable employee columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EmployeeChanges<'a> {
    pub name: &'a str,
    pub tax_id: &'a str,
    pub secondary_id: Option<&'a str>,
    pub department_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeRow {
    fn from(employee: &Employee) -> Self {
        Self {
            id: *employee.id.as_uuid(),
            name: employee.name.clone(),
            tax_id: employee.tax_id.as_str().to_owned(),
            secondary_id: employee.secondary_id.clone(),
            department_id: *employee.department_id.as_uuid(),
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

impl<'a> From<&'a Employee> for EmployeeChanges<'a> {
    fn from(employee: &'a Employee) -> Self {
        Self {
            name: employee.name.as_str(),
            tax_id: employee.tax_id.as_str(),
            secondary_id: employee.secondary_id.as_deref(),
            department_id: *employee.department_id.as_uuid(),
            updated_at: employee.updated_at,
        }
    }
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = String;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let tax_id = TaxId::parse(&row.tax_id)
            .map_err(|err| format!("employee {} has an invalid stored tax id: {err}", row.id))?;
        Ok(Self {
            id: EmployeeId::from_uuid(row.id),
            name: row.name,
            tax_id,
            secondary_id: row.secondary_id,
            department_id: DepartmentId::from_uuid(row.department_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Result row of the ancestor loop check.
#[derive(Debug, QueryableByName)]
pub(crate) struct LoopCheckRow {
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub closes_loop: bool,
}
