use crate::errors::AppError;
use crate::observability::MetricsRecorder;
use crate::rate_limit::fixed_window::{
    now_millis, FixedWindowLimiter, RateLimitDecision, RateLimitPolicy,
};
use axum::{
    extract::{Request, State},
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Limiter plus the route name and policy one group of handlers is held to
#[derive(Clone)]
pub struct RouteLimit {
    pub limiter: FixedWindowLimiter,
    pub route: &'static str,
    pub policy: RateLimitPolicy,
}

impl RouteLimit {
    pub fn new(limiter: FixedWindowLimiter, route: &'static str, policy: RateLimitPolicy) -> Self {
        Self {
            limiter,
            route,
            policy,
        }
    }

    /// Limiter key for a client on this route, e.g. `classify-203.0.113.9`
    pub fn key_for(&self, client_ip: &str) -> String {
        format!("{}-{}", self.route, client_ip)
    }
}

/// Rate limiting middleware, keyed by route and client IP
pub async fn enforce(
    State(limit): State<RouteLimit>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_ip = extract_client_ip(&headers);
    let key = limit.key_for(&client_ip);

    let decision = limit.limiter.check(&key, &limit.policy).await?;

    if !decision.allowed {
        let retry_after_secs = decision.retry_after_secs(now_millis());

        tracing::warn!(
            key = %key,
            limit = %decision.limit,
            count = %decision.count,
            retry_after_secs = %retry_after_secs,
            "Rate limit exceeded"
        );
        MetricsRecorder::record_rate_limit_exceeded(limit.route);

        return Err(AppError::RateLimitExceeded { retry_after_secs });
    }

    let mut response = next.run(request).await;
    add_rate_limit_headers(response.headers_mut(), &decision);

    Ok(response)
}

/// Client address from proxy headers, or `unknown`
pub fn extract_client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(ips) = forwarded_for.to_str() {
            if let Some(first) = ips.split(',').next().map(str::trim) {
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    // Not trustworthy; every header-less client shares this bucket
    "unknown".to_string()
}

/// Add rate limit headers to response
fn add_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let values = [
        ("x-ratelimit-limit", decision.limit),
        ("x-ratelimit-remaining", decision.remaining),
        ("x-ratelimit-reset", decision.reset_unix_secs()),
    ];

    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}
