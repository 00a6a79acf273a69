//! Builders wiring repositories into services and HTTP state.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use orgchart::domain::ports::{DepartmentRepository, EmployeeRepository};
use orgchart::domain::{DepartmentService, EmployeeService};
use orgchart::inbound::http::state::HttpState;
use orgchart::outbound::memory::MemoryStore;
use orgchart::outbound::persistence::{
    DbPool, DieselDepartmentRepository, DieselEmployeeRepository, PoolConfig, run_migrations,
};
use orgchart::settings::AppSettings;

use super::{ServerConfig, StoreBackend};

/// Build both services over one pair of repositories.
fn services_over<E, D>(employees: Arc<E>, departments: Arc<D>, walk_timeout: Duration) -> HttpState
where
    E: EmployeeRepository + 'static,
    D: DepartmentRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let employee_service =
        EmployeeService::new(employees.clone(), departments.clone(), clock.clone());
    let department_service =
        DepartmentService::new(departments, employees, clock).with_walk_timeout(walk_timeout);
    HttpState::from_services(Arc::new(employee_service), Arc::new(department_service))
        .with_closure_timeout(walk_timeout)
}

/// Build handler state for the configured store.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.store {
        StoreBackend::Postgres(pool) => services_over(
            Arc::new(DieselEmployeeRepository::new(pool.clone())),
            Arc::new(DieselDepartmentRepository::new(pool.clone())),
            config.closure_timeout,
        ),
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            services_over(store.clone(), store, config.closure_timeout)
        }
    }
}

/// Connect to the configured database, retrying, and apply migrations.
///
/// Falls back to the in-memory store when no database URL is set.
pub async fn connect_store(settings: &AppSettings) -> Result<StoreBackend> {
    let Some(url) = settings.database_url() else {
        warn!("no database configured; using the in-memory store");
        return Ok(StoreBackend::Memory);
    };

    let attempts = settings.db_connect_attempts();
    let mut attempt = 1;
    let pool = loop {
        let config = PoolConfig::new(url).with_max_size(settings.db_max_pool_size());
        match DbPool::new(config).await {
            Ok(pool) => break pool,
            Err(err) if attempt < attempts => {
                warn!(attempt, attempts, error = %err, "database not reachable; retrying");
                tokio::time::sleep(settings.db_connect_retry()).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(eyre!(
                    "database unreachable after {attempts} attempts: {err}"
                ));
            }
        }
    };

    let migration_url = url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database migrations applied");
    Ok(StoreBackend::Postgres(pool))
}
