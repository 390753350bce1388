//! Prometheus scrape endpoint.
//!
//! Exposes the saga counters and checkout duration histogram recorded by
//! the orchestrator and compensation engine.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics — renders the current metric snapshot in Prometheus
/// exposition format. Unauthenticated.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
