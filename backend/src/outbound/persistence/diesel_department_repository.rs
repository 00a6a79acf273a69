//! PostgreSQL-backed `DepartmentRepository` implementation using Diesel ORM.
//!
//! Reparenting runs in a serializable transaction that re-reads the ancestor
//! chain of the proposed parent before writing. Two writers that would
//! together close a loop cannot both commit: either the second sees the
//! first's row, or PostgreSQL aborts one of them with a serialization
//! failure, which is reported as a cycle.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{DepartmentRepository, DepartmentRepositoryError};
use crate::domain::{Department, DepartmentFilter, DepartmentId, EmployeeId};

use super::diesel_error_mapping::{
    DEPARTMENTS_MANAGER_ID_KEY, DEPARTMENTS_NOT_OWN_PARENT, DEPARTMENTS_PKEY, StoreFailure,
    classify, contains_pattern, to_count, to_offset,
};
use super::models::{DepartmentChanges, DepartmentRow, LoopCheckRow};
use super::pool::{DbPool, PoolError};
use super::schema::departments;

/// True when `$2` is `$1` or one of its ancestors.
const CLOSES_LOOP_SQL: &str = "\
WITH RECURSIVE ancestors (id, parent_id) AS ( \
    SELECT id, parent_id FROM departments WHERE id = $1 \
    UNION \
    SELECT d.id, d.parent_id FROM departments d \
    JOIN ancestors a ON d.id = a.parent_id \
) \
SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $2) AS closes_loop";

/// Diesel-backed implementation of the `DepartmentRepository` port.
#[derive(Clone)]
pub struct DieselDepartmentRepository {
    pool: DbPool,
}

impl DieselDepartmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Result of the transactional replace.
enum ReplaceOutcome {
    Replaced,
    Missing,
    ClosesLoop,
}

fn map_pool_error(error: PoolError) -> DepartmentRepositoryError {
    DepartmentRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> DepartmentRepositoryError {
    map_failure(classify(error), None)
}

/// Translate a failure; `department` is the row being written, if any.
fn map_failure(
    failure: StoreFailure,
    department: Option<&Department>,
) -> DepartmentRepositoryError {
    let Some(department) = department else {
        return match failure {
            StoreFailure::Connection(message) => DepartmentRepositoryError::connection(message),
            StoreFailure::ForeignKey { .. } => DepartmentRepositoryError::still_referenced(
                "child departments or employees reference the department",
            ),
            other => DepartmentRepositoryError::query(other.describe()),
        };
    };

    if failure.is_constraint(DEPARTMENTS_MANAGER_ID_KEY) {
        return DepartmentRepositoryError::manager_already_assigned(
            department
                .manager_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        );
    }
    if failure.is_constraint(DEPARTMENTS_PKEY) {
        return DepartmentRepositoryError::duplicate_id(department.id.to_string());
    }
    if failure.is_constraint(DEPARTMENTS_NOT_OWN_PARENT) {
        return DepartmentRepositoryError::cycle(department.id.to_string());
    }
    match failure {
        StoreFailure::Connection(message) => DepartmentRepositoryError::connection(message),
        StoreFailure::Serialization => DepartmentRepositoryError::cycle(department.id.to_string()),
        StoreFailure::ForeignKey { .. } => DepartmentRepositoryError::missing_reference(
            "manager or parent department does not exist",
        ),
        other => DepartmentRepositoryError::query(other.describe()),
    }
}

fn to_uuids(ids: &[DepartmentId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

fn rows_to_departments(rows: Vec<DepartmentRow>) -> Vec<Department> {
    rows.into_iter().map(Department::from).collect()
}

fn filtered(filter: &DepartmentFilter) -> departments::BoxedQuery<'static, Pg> {
    let mut query = departments::table.into_boxed();
    if let Some(name) = filter.name.as_deref() {
        query = query.filter(departments::name.ilike(contains_pattern(name)));
    }
    if let Some(parent_id) = filter.parent_id {
        query = query.filter(departments::parent_id.eq(*parent_id.as_uuid()));
    }
    query
}

#[async_trait]
impl DepartmentRepository for DieselDepartmentRepository {
    async fn find_by_id(
        &self,
        id: &DepartmentId,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = departments::table
            .find(*id.as_uuid())
            .select(DepartmentRow::as_select())
            .first::<DepartmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Department::from))
    }

    async fn find_by_manager(
        &self,
        manager_id: &EmployeeId,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = departments::table
            .filter(departments::manager_id.eq(*manager_id.as_uuid()))
            .select(DepartmentRow::as_select())
            .first::<DepartmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Department::from))
    }

    async fn count(&self) -> Result<u64, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total = departments::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_count(total))
    }

    async fn list_by_parent(
        &self,
        parent_id: &DepartmentId,
    ) -> Result<Vec<Department>, DepartmentRepositoryError> {
        self.list_by_parents(std::slice::from_ref(parent_id)).await
    }

    async fn list_by_parents(
        &self,
        parent_ids: &[DepartmentId],
    ) -> Result<Vec<Department>, DepartmentRepositoryError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = departments::table
            .filter(departments::parent_id.eq_any(to_uuids(parent_ids)))
            .select(DepartmentRow::as_select())
            .order((departments::name.asc(), departments::id.asc()))
            .load::<DepartmentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows_to_departments(rows))
    }

    async fn list_all(&self) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = departments::table
            .select(DepartmentRow::as_select())
            .order((departments::name.asc(), departments::id.asc()))
            .load::<DepartmentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows_to_departments(rows))
    }

    async fn list(
        &self,
        filter: &DepartmentFilter,
        page: PageRequest,
    ) -> Result<Page<Department>, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = filtered(filter)
            .select(DepartmentRow::as_select())
            .order((departments::name.asc(), departments::id.asc()))
            .limit(i64::from(page.limit()))
            .offset(to_offset(page.offset()))
            .load::<DepartmentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(rows_to_departments(rows), to_count(total), page))
    }

    async fn create(&self, department: &Department) -> Result<(), DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(departments::table)
            .values(DepartmentRow::from(department))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), Some(department)))?;
        Ok(())
    }

    async fn update(&self, department: &Department) -> Result<bool, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *department.id.as_uuid();
        let parent_id = department.parent_id.map(|parent| *parent.as_uuid());
        let row = DepartmentRow::from(department);

        let outcome = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    if let Some(parent_id) = parent_id {
                        let check = diesel::sql_query(CLOSES_LOOP_SQL)
                            .bind::<sql_types::Uuid, _>(parent_id)
                            .bind::<sql_types::Uuid, _>(id)
                            .get_result::<LoopCheckRow>(conn)
                            .await?;
                        if check.closes_loop {
                            return Ok(ReplaceOutcome::ClosesLoop);
                        }
                    }
                    let changes = DepartmentChanges {
                        name: &row.name,
                        description: row.description.as_deref(),
                        manager_id: row.manager_id,
                        parent_id: row.parent_id,
                        updated_at: row.updated_at,
                    };
                    let affected = diesel::update(departments::table.find(id))
                        .set(changes)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(if affected > 0 {
                        ReplaceOutcome::Replaced
                    } else {
                        ReplaceOutcome::Missing
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_failure(classify(err), Some(department)))?;

        match outcome {
            ReplaceOutcome::Replaced => Ok(true),
            ReplaceOutcome::Missing => Ok(false),
            ReplaceOutcome::ClosesLoop => {
                Err(DepartmentRepositoryError::cycle(department.id.to_string()))
            }
        }
    }

    async fn delete(&self, id: &DepartmentId) -> Result<bool, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(departments::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
