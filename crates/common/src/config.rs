//! Configuration management for the application.
//!
//! Settings are layered from configuration files and `APP_`-prefixed
//! environment variables, then validated before the server starts.
//!
//! ## Example Configuration
//!
//! ```toml
//! [server]
//! port = 8080
//! cors_origins = ["http://localhost:5173"]
//!
//! [database]
//! url = "postgres://localhost:5432/studyhub"
//!
//! [rate_limit.auth]
//! max_requests = 20
//! window_seconds = 900
//!
//! [stats]
//! rolling_window_days = 7
//! ```
//!
//! Leaving `database.url` unset runs the service on the in-memory store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub groups: GroupsConfig,
    #[serde(default)]
    pub stats: StatsSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            max_body_size: default_max_body_size(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: Option<String>,

    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_db_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            timeout_seconds: default_db_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens
    pub jwt_secret: String,

    /// Token expiry duration in seconds
    #[serde(default = "default_token_expiry")]
    pub token_expiry_seconds: u64,
}

/// Request limits for a group of routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl RateLimitPolicy {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Applied to every route
    #[serde(default = "default_general_policy")]
    pub general: RateLimitPolicy,

    /// Applied to `/auth` routes on top of `general`
    #[serde(default = "default_auth_policy")]
    pub auth: RateLimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general: default_general_policy(),
            auth: default_auth_policy(),
        }
    }
}

/// Group limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsConfig {
    #[serde(default = "default_max_members")]
    pub max_members: usize,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            max_members: default_max_members(),
        }
    }
}

/// Statistics windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSettings {
    /// Trailing days averaged for each activity point
    #[serde(default = "default_rolling_window")]
    pub rolling_window_days: u32,

    /// Default length of the activity series
    #[serde(default = "default_activity_days")]
    pub activity_days: u32,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            rolling_window_days: default_rolling_window(),
            activity_days: default_activity_days(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable JSON logging format
    #[serde(default)]
    pub json_logging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json_logging: false,
            log_level: default_log_level(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_pool_size() -> u32 {
    10
}

fn default_db_timeout() -> u64 {
    30
}

fn default_token_expiry() -> u64 {
    86400 // 24 hours
}

fn default_true() -> bool {
    true
}

fn default_general_policy() -> RateLimitPolicy {
    RateLimitPolicy {
        max_requests: 300,
        window_seconds: 900,
    }
}

fn default_auth_policy() -> RateLimitPolicy {
    RateLimitPolicy {
        max_requests: 20,
        window_seconds: 900,
    }
}

fn default_max_members() -> usize {
    50
}

fn default_rolling_window() -> u32 {
    7
}

fn default_activity_days() -> u32 {
    30
}

fn default_service_name() -> String {
    "studyhub".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Upper bound for the statistics windows, in days
pub const MAX_STATS_WINDOW_DAYS: u32 = 365;

impl AppConfig {
    /// Load configuration from configuration files and environment variables.
    ///
    /// Later sources override earlier ones:
    /// 1. config/default.toml (if exists)
    /// 2. config/{environment}.toml (if exists, where environment is from APP_ENV)
    /// 3. Environment variables (prefixed with APP_, e.g. `APP_SERVER__PORT=3000`)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use studyhub_common::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load configuration");
    /// println!("Server will run on {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.request_timeout_seconds == 0 {
            anyhow::bail!("Request timeout must be greater than 0");
        }

        if let Some(url) = &self.database.url {
            if url.is_empty() {
                anyhow::bail!("Database URL must not be empty when set");
            }
        }

        if self.database.pool_size == 0 {
            anyhow::bail!("Database pool size must be greater than 0");
        }

        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!("JWT secret must be at least 32 characters long");
        }

        if self.auth.token_expiry_seconds == 0 {
            anyhow::bail!("Token expiry must be greater than 0");
        }

        for (name, policy) in [("general", &self.rate_limit.general), ("auth", &self.rate_limit.auth)] {
            if policy.window_seconds == 0 || policy.max_requests == 0 {
                anyhow::bail!("Rate limit policy '{}' needs a non-zero window and limit", name);
            }
        }

        if self.groups.max_members < 2 {
            anyhow::bail!("Groups must allow at least 2 members");
        }

        for (name, days) in [
            ("rolling_window_days", self.stats.rolling_window_days),
            ("activity_days", self.stats.activity_days),
        ] {
            if !(1..=MAX_STATS_WINDOW_DAYS).contains(&days) {
                anyhow::bail!(
                    "stats.{} must be between 1 and {} days",
                    name,
                    MAX_STATS_WINDOW_DAYS
                );
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.telemetry.log_level,
                VALID_LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    /// Get the database connection timeout as a Duration
    pub fn database_timeout(&self) -> Duration {
        Duration::from_secs(self.database.timeout_seconds)
    }

    /// Get the token expiry as a Duration
    pub fn token_expiry(&self) -> Duration {
        Duration::from_secs(self.auth.token_expiry_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    /// Create a development configuration with sensible defaults
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                ..ServerConfig::default()
            },
            database: DatabaseConfig {
                url: None,
                pool_size: 5,
                timeout_seconds: 30,
            },
            auth: AuthConfig {
                jwt_secret: "development-secret-key-minimum-32-chars".to_string(),
                token_expiry_seconds: 86400,
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                ..RateLimitConfig::default()
            },
            groups: GroupsConfig::default(),
            stats: StatsSettings::default(),
            telemetry: TelemetryConfig {
                service_name: "studyhub-dev".to_string(),
                json_logging: false,
                log_level: "debug".to_string(),
            },
        }
    }

    /// Configuration used by tests: in-memory store, no rate limiting
    pub fn test() -> Self {
        let mut config = Self::development();
        config.auth.jwt_secret = "test-secret-key-that-is-long-enough-0123".to_string();
        config.auth.token_expiry_seconds = 3600;
        config.telemetry.log_level = "warn".to_string();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::test();

        assert!(config.validate().is_ok());

        config.server.port = 0;
        assert!(config.validate().is_err());
        config.server.port = 8080;

        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
        config.auth.jwt_secret = "a".repeat(32);

        config.telemetry.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
        config.telemetry.log_level = "info".to_string();

        config.rate_limit.auth.window_seconds = 0;
        assert!(config.validate().is_err());
        config.rate_limit.auth.window_seconds = 60;

        config.database.url = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stats_windows_are_bounded() {
        let mut config = AppConfig::test();

        config.stats.rolling_window_days = MAX_STATS_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.stats.rolling_window_days = 100_000;
        assert!(config.validate().is_err());
        config.stats.rolling_window_days = 0;
        assert!(config.validate().is_err());
        config.stats.rolling_window_days = 7;

        config.stats.activity_days = MAX_STATS_WINDOW_DAYS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_from_minimal_source() {
        let config: AppConfig = config::Config::builder()
            .set_override("auth.jwt_secret", "x".repeat(40))
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert_eq!(config.rate_limit.general.max_requests, 300);
        assert_eq!(config.rate_limit.auth.max_requests, 20);
        assert_eq!(config.groups.max_members, 50);
        assert_eq!(config.stats.rolling_window_days, 7);
        assert_eq!(config.stats.activity_days, 30);
        assert!(config.validate().is_ok());
    }
}
