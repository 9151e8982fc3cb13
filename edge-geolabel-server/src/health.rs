use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use edge_geolabel_updater::LifecycleState;
use prometheus::{Registry, TEXT_FORMAT, TextEncoder};

struct Health {
    lifecycle: Arc<LifecycleState>,
    registry: Registry,
}

/// Liveness and readiness checks backed by the updater's lifecycle flags,
/// plus the Prometheus metrics in `registry`.
pub(crate) fn router(lifecycle: Arc<LifecycleState>, registry: Registry) -> Router {
    let health = Arc::new(Health {
        lifecycle,
        registry,
    });
    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(health)
}

async fn live(State(health): State<Arc<Health>>) -> StatusCode {
    status(health.lifecycle.is_live())
}

async fn ready(State(health): State<Arc<Health>>) -> StatusCode {
    status(health.lifecycle.is_ready())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics(State(health): State<Arc<Health>>) -> Result<impl IntoResponse, StatusCode> {
    TextEncoder::new()
        .encode_to_string(&health.registry.gather())
        .map(|text| ([(header::CONTENT_TYPE, TEXT_FORMAT)], text))
        .map_err(|err| {
            tracing::error!(?err, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

fn status(up: bool) -> StatusCode {
    if up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
