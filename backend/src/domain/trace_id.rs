//! Correlation identifier shared by logs, error payloads and responses.
//!
//! The middleware installs one identifier per request in task-local storage;
//! [`crate::domain::Error`] reads it on construction so every failure a
//! request produces names the same id. Task-locals do not follow
//! `tokio::spawn`, so wrap spawned work in [`TraceId::scope`] again.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header used to accept and echo the identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static ACTIVE: TraceId;
}

/// Reasons an externally supplied identifier is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceIdError {
    /// Not a hyphenated or simple UUID.
    #[error("trace id is not a UUID: {0}")]
    Malformed(String),
    /// The nil UUID carries no correlation value.
    #[error("trace id must not be the nil UUID")]
    Nil,
}

/// Per-request correlation identifier.
///
/// # Examples
/// ```
/// use orgchart::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id: TraceId = "6f1c1e2a-7a53-4c58-9d2e-1f7e5d0c9b11".parse().expect("uuid");
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the enclosing request, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the active identifier.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        ACTIVE.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = TraceIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(raw.trim())
            .map_err(|_| TraceIdError::Malformed(raw.to_owned()))?;
        if uuid.is_nil() {
            return Err(TraceIdError::Nil);
        }
        Ok(Self(uuid))
    }
}
