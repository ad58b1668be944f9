// Listing size tiers and route rate limiting

pub mod api;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod rate_limit;
pub mod redis;

pub use classifier::{classify, Tier};
pub use config::Config;
pub use errors::{AppError, Result};

use crate::config::RateLimitBackend;
use crate::observability::HealthChecker;
use crate::rate_limit::{
    FixedWindowLimiter, InMemoryWindowStore, RedisWindowStore, Sweeper, WindowStore,
};
use std::sync::Arc;
use std::time::Duration;

/// Router plus the background work it owns
pub struct App {
    pub router: axum::Router,
    /// Set for the in-memory backend; stop it on shutdown
    pub sweeper: Option<Sweeper>,
}

/// Wire the rate-limit store, sweeper, health checks and routes from config
pub async fn build_app(config: &Config) -> Result<App> {
    let (store, sweeper, redis_manager): (Arc<dyn WindowStore>, _, _) =
        match config.rate_limit.backend {
            RateLimitBackend::Memory => {
                let store: Arc<dyn WindowStore> = Arc::new(InMemoryWindowStore::new());
                let sweeper = Sweeper::spawn(
                    store.clone(),
                    Duration::from_secs(config.rate_limit.sweep_interval_seconds),
                );
                tracing::info!("Using in-memory rate limit store");
                (store, Some(sweeper), None)
            }
            RateLimitBackend::Redis => {
                let manager = crate::redis::create_client(&config.redis).await?;
                let store: Arc<dyn WindowStore> = Arc::new(RedisWindowStore::new(manager.clone()));
                tracing::info!("Using redis rate limit store");
                (store, None, Some(manager))
            }
        };

    let limiter = FixedWindowLimiter::new(store);
    let health_checker = Arc::new(HealthChecker::new(redis_manager));

    let router = api::create_router(limiter, &config.rate_limit, &config.cors, health_checker);

    Ok(App { router, sweeper })
}
