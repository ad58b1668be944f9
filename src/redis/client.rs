use crate::{
    config::RedisConfig,
    errors::{AppError, Result},
};
use redis::{aio::ConnectionManager, Client};
use std::time::Duration;

/// Create a Redis client and connection manager
pub async fn create_client(config: &RedisConfig) -> Result<ConnectionManager> {
    tracing::info!("Creating Redis client");

    let client = Client::open(config.url.as_str())?;

    let manager = tokio::time::timeout(
        Duration::from_secs(config.connection_timeout_seconds),
        ConnectionManager::new(client),
    )
    .await
    .map_err(|_| {
        AppError::Configuration(format!(
            "Redis connection timed out after {}s",
            config.connection_timeout_seconds
        ))
    })??;

    tracing::info!("Redis client connected");

    Ok(manager)
}

/// Health check for Redis connection
pub async fn health_check(manager: &mut ConnectionManager) -> Result<()> {
    let _: String = redis::cmd("PING").query_async(manager).await?;
    Ok(())
}
