use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub rate_limit_store: ComponentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
    pub message: Option<String>,
}

impl ComponentStatus {
    fn ok(message: Option<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message,
        }
    }
}

pub struct HealthChecker {
    // Present only when windows live in Redis
    redis_manager: Option<ConnectionManager>,
}

impl HealthChecker {
    pub fn new(redis_manager: Option<ConnectionManager>) -> Self {
        Self { redis_manager }
    }

    /// Liveness check - is the service running?
    pub async fn liveness(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks {
                rate_limit_store: ComponentStatus {
                    status: "unknown".to_string(),
                    message: None,
                },
            },
        }
    }

    /// Readiness check - can the service handle requests?
    pub async fn readiness(&self) -> HealthStatus {
        let store_status = self.check_rate_limit_store().await;

        let overall_status = if store_status.status == "ok" {
            "ok"
        } else {
            "degraded"
        };

        HealthStatus {
            status: overall_status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks {
                rate_limit_store: store_status,
            },
        }
    }

    async fn check_rate_limit_store(&self) -> ComponentStatus {
        let Some(manager) = &self.redis_manager else {
            return ComponentStatus::ok(Some("in-memory".to_string()));
        };

        let mut manager = manager.clone();
        match crate::redis::health_check(&mut manager).await {
            Ok(_) => ComponentStatus::ok(Some("redis".to_string())),
            Err(e) => ComponentStatus {
                status: "error".to_string(),
                message: Some(format!("Redis check failed: {}", e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_is_always_ready() {
        let checker = HealthChecker::new(None);

        let status = checker.readiness().await;

        assert!(status.is_ok());
        assert_eq!(status.checks.rate_limit_store.message.as_deref(), Some("in-memory"));
    }

    #[tokio::test]
    async fn test_liveness_reports_version() {
        let status = HealthChecker::new(None).liveness().await;
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }
}
