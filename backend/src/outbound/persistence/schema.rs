//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Organisational departments forming a forest through `parent_id`.
    departments (id) {
        id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        /// Unique: an employee manages at most one department.
        manager_id -> Nullable<Uuid>,
        parent_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Employees, each assigned to exactly one department.
    employees (id) {
        id -> Uuid,
        name -> Text,
        /// Eleven digits, unique.
        tax_id -> Text,
        secondary_id -> Nullable<Text>,
        department_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(departments, employees);
