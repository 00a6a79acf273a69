//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use orgchart::outbound::persistence::DbPool;
use orgchart::settings::AppSettings;

/// Record store the server wires its services to.
#[derive(Clone)]
pub enum StoreBackend {
    /// PostgreSQL through the shared pool.
    Postgres(DbPool),
    /// Process-local store; data is lost on restart.
    Memory,
}

impl StoreBackend {
    /// Short name reported by the readiness probe.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory => "memory",
        }
    }
}

/// Everything `create_server` needs, resolved from [`AppSettings`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: StoreBackend,
    pub(crate) closure_timeout: Duration,
}

impl ServerConfig {
    /// Construct a configuration over an already connected store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, store: StoreBackend, settings: &AppSettings) -> Self {
        Self {
            bind_addr,
            store,
            closure_timeout: settings.closure_timeout(),
        }
    }
}
