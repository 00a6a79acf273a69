//! Organisation chart server entry-point.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use orgchart::inbound::http::health::HealthState;
use orgchart::settings::AppSettings;

use server::{ServerConfig, connect_store, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let store = connect_store(&settings).await?;
    let health_state = web::Data::new(HealthState::new(store.label()));

    info!(%bind_addr, store = store.label(), "starting server");
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(bind_addr, store, &settings),
    )
    .wrap_err("failed to bind HTTP listener")?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated abnormally")
}
