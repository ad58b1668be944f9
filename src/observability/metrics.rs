use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;

// Metrics registry
static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap()
});

static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 5.0]
    )
    .unwrap()
});

static CLASSIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "listing_classifications_total",
        "Listings classified, by resulting tier",
        &["tier"]
    )
    .unwrap()
});

static RATE_LIMIT_EXCEEDED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rate_limit_exceeded_total",
        "Total number of rate limit violations",
        &["route"]
    )
    .unwrap()
});

static RATE_LIMIT_SWEPT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "rate_limit_swept_entries_total",
        "Expired rate limit windows removed by the sweeper"
    )
    .unwrap()
});

pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn record_http_request(method: &str, path: &str, status: u16) {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
    }

    pub fn record_http_duration(method: &str, path: &str, duration: f64) {
        HTTP_REQUEST_DURATION
            .with_label_values(&[method, path])
            .observe(duration);
    }

    pub fn record_classification(tier: &str) {
        CLASSIFICATIONS_TOTAL.with_label_values(&[tier]).inc();
    }

    pub fn record_rate_limit_exceeded(route: &str) {
        RATE_LIMIT_EXCEEDED_TOTAL.with_label_values(&[route]).inc();
    }

    pub fn record_swept_entries(count: usize) {
        RATE_LIMIT_SWEPT_TOTAL.inc_by(count as u64);
    }

    /// Export all metrics in Prometheus format
    pub fn export() -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        encoder.encode_to_string(&metric_families)
    }
}

/// Record count and latency of every request, labelled by matched route
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    MetricsRecorder::record_http_request(&method, &path, response.status().as_u16());
    MetricsRecorder::record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}
