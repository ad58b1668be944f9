use crate::observability::{HealthChecker, HealthStatus, MetricsRecorder};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /health/live
pub async fn liveness(State(health_checker): State<Arc<HealthChecker>>) -> Json<HealthStatus> {
    Json(health_checker.liveness().await)
}

/// GET /health/ready
///
/// The body is returned either way; a degraded window store turns the status
/// into 503 so load balancers stop routing here.
#[tracing::instrument(skip_all)]
pub async fn readiness(
    State(health_checker): State<Arc<HealthChecker>>,
) -> (StatusCode, Json<HealthStatus>) {
    let status = health_checker.readiness().await;

    if status.is_ok() {
        return (StatusCode::OK, Json(status));
    }

    tracing::warn!(
        store = %status.checks.rate_limit_store.status,
        message = ?status.checks.rate_limit_store.message,
        "Window store not ready"
    );
    (StatusCode::SERVICE_UNAVAILABLE, Json(status))
}

/// GET /metrics
pub async fn metrics() -> Result<impl IntoResponse, StatusCode> {
    let body = MetricsRecorder::export().map_err(|e| {
        tracing::error!("Failed to export metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
