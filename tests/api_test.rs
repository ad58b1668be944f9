use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use listing_tiers::{
    api::create_router,
    config::{CorsConfig, RateLimitConfig},
    observability::HealthChecker,
    rate_limit::{FixedWindowLimiter, InMemoryWindowStore, RateLimitPolicy},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(classify_max: u64) -> Router {
    let mut rate_limit = RateLimitConfig::default();
    rate_limit.routes.insert(
        "classify".to_string(),
        RateLimitPolicy {
            window_ms: 60_000,
            max_requests: classify_max,
        },
    );

    let limiter = FixedWindowLimiter::new(Arc::new(InMemoryWindowStore::new()));
    create_router(
        limiter,
        &rate_limit,
        &CorsConfig::default(),
        Arc::new(HealthChecker::new(None)),
    )
}

fn classify_request(ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/listings/classify")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_classify_returns_tier_and_package() {
    let app = app(10);
    let body = r#"{"text": "Vendo auto. Buen estado. Precio: S/. 5000"}"#;

    let response = app.oneshot(classify_request("203.0.113.1", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-ratelimit-limit").unwrap(), "10");
    assert_eq!(response.headers().get("x-ratelimit-remaining").unwrap(), "9");

    let json = json_body(response).await;
    assert_eq!(json["tier"], "miniature");
    assert_eq!(json["package"]["price"], 15);
    assert_eq!(json["package"]["description"], "1x1 - no image");
    assert_eq!(json["features"]["effective_lines"], 1);
}

#[tokio::test]
async fn test_empty_text_is_small() {
    let app = app(10);

    let response = app
        .oneshot(classify_request("203.0.113.1", r#"{"text": ""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["tier"], "small");
}

#[tokio::test]
async fn test_third_request_over_limit_is_429_with_retry_after() {
    let app = app(2);
    let body = r#"{"text": "Alquilo cuarto"}"#;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(classify_request("198.51.100.4", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(classify_request("198.51.100.4", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(json_body(response).await["status"], 429);

    // Another client has its own window
    let other = app
        .oneshot(classify_request("198.51.100.5", body))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_text_is_bad_request() {
    let app = app(10);
    let body = serde_json::json!({ "text": "a".repeat(20_001) }).to_string();

    let response = app.oneshot(classify_request("203.0.113.1", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_tiers() {
    let app = app(10);

    let response = app
        .oneshot(Request::builder().uri("/v1/tiers").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let tiers: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["tier"].as_str().unwrap())
        .collect();
    assert_eq!(tiers, vec!["miniature", "small", "medium", "large", "huge"]);
}

#[tokio::test]
async fn test_health_ready() {
    let app = app(10);

    let response = app
        .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["checks"]["rate_limit_store"]["status"], "ok");
    assert_eq!(json["checks"]["rate_limit_store"]["message"], "in-memory");
}

#[tokio::test]
async fn test_health_live() {
    let app = app(10);

    let response = app
        .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_metrics_are_plain_text() {
    let app = app(10);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}
