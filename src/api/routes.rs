use crate::{
    api::{classify, health},
    config::{CorsConfig, RateLimitConfig},
    observability::{track_http_metrics, HealthChecker},
    rate_limit::{enforce, FixedWindowLimiter, RouteLimit},
};
use axum::{
    extract::FromRef,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub health_checker: Arc<HealthChecker>,
}

pub fn create_router(
    limiter: FixedWindowLimiter,
    rate_limit: &RateLimitConfig,
    cors: &CorsConfig,
    health_checker: Arc<HealthChecker>,
) -> Router {
    let state = AppState { health_checker };

    Router::new()
        // Health endpoints
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        .nest("/v1", v1_routes(limiter, rate_limit))
        // Add middleware
        .layer(middleware::from_fn(track_http_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

fn v1_routes(limiter: FixedWindowLimiter, rate_limit: &RateLimitConfig) -> Router<AppState> {
    let classify_limit = RouteLimit::new(
        limiter.clone(),
        "classify",
        rate_limit.policy_for("classify"),
    );
    let tiers_limit = RouteLimit::new(limiter, "tiers", rate_limit.policy_for("tiers"));

    Router::new()
        .route(
            "/listings/classify",
            post(classify::classify)
                .route_layer(middleware::from_fn_with_state(classify_limit, enforce)),
        )
        .route(
            "/tiers",
            get(classify::list_tiers)
                .route_layer(middleware::from_fn_with_state(tiers_limit, enforce)),
        )
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
