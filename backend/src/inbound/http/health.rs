//! Liveness and readiness probes for orchestrators and load balancers.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde_json::json;

/// Probe state shared between the server and the health handlers.
///
/// Starts live but not ready; startup marks it ready once the store is
/// wired, and shutdown marks it unhealthy so liveness fails while draining.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    store: &'static str,
}

impl HealthState {
    /// Create probe state for a server backed by the named store.
    pub fn new(store: &'static str) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            store,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so the orchestrator stops routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(&self, probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(json!({
                "status": if probe_ok { "ok" } else { "unavailable" },
                "store": self.store,
            }))
    }
}

/// Readiness probe: 200 once the store is wired, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.probe_response(state.is_ready())
}

/// Liveness probe: 200 while running, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    async fn probe(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(ready)
                .service(live),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn ready_waits_for_startup() {
        let state = web::Data::new(HealthState::new("memory"));
        let (status, body) = probe(state.clone(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");

        state.mark_ready();
        let (status, body) = probe(state, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "memory");
    }

    #[rstest]
    #[actix_web::test]
    async fn live_fails_once_draining() {
        let state = web::Data::new(HealthState::new("postgres"));
        let (status, _) = probe(state.clone(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);

        state.mark_unhealthy();
        let (status, body) = probe(state, "/health/live").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["store"], "postgres");
    }
}
