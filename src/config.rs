use crate::errors::{AppError, Result};
use crate::rate_limit::RateLimitPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Where rate-limit windows live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    /// Process memory, reset on restart
    Memory,
    /// Shared across instances through Redis
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub backend: RateLimitBackend,
    pub sweep_interval_seconds: u64,
    /// Policy for routes without their own entry
    pub default: RateLimitPolicy,
    #[serde(default)]
    pub routes: HashMap<String, RateLimitPolicy>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let mut routes = HashMap::new();
        routes.insert("classify".to_string(), RateLimitPolicy::per_minute(20));
        routes.insert("tiers".to_string(), RateLimitPolicy::per_minute(120));

        Self {
            backend: RateLimitBackend::Memory,
            sweep_interval_seconds: 300,
            default: RateLimitPolicy::per_minute(60),
            routes,
        }
    }
}

impl RateLimitConfig {
    /// Policy for a named route, falling back to the default
    pub fn policy_for(&self, route: &str) -> RateLimitPolicy {
        self.routes.get(route).copied().unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub connection_timeout_seconds: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout_seconds: 5,
        }
    }
}

/// Log line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, for log shippers
    Json,
    #[default]
    Pretty,
    /// Single line per event without targets
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let environment =
            env::var("LISTING_TIERS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(
                config::File::with_name(&format!("config/{}", environment)).required(false),
            )
            // e.g., LISTING_TIERS__SERVER__PORT=8080
            .add_source(
                config::Environment::with_prefix("LISTING_TIERS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Configuration(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Configuration("Invalid port number".to_string()));
        }

        if self.rate_limit.sweep_interval_seconds == 0 {
            return Err(AppError::Configuration(
                "Sweep interval must be greater than zero".to_string(),
            ));
        }

        self.rate_limit
            .default
            .validate()
            .map_err(|e| AppError::Configuration(format!("rate_limit.default: {}", e)))?;

        for (route, policy) in &self.rate_limit.routes {
            policy
                .validate()
                .map_err(|e| AppError::Configuration(format!("rate_limit.routes.{}: {}", route, e)))?;
        }

        if self.rate_limit.backend == RateLimitBackend::Redis && self.redis.url.is_empty() {
            return Err(AppError::Configuration(
                "Redis URL is required for the redis rate-limit backend".to_string(),
            ));
        }

        Ok(())
    }
}
