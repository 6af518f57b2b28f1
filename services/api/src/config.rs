//! Service configuration
//!
//! Defaults are overlaid by `APP_*` environment variables, e.g.
//! `APP_PORT=9000` or `APP_TOKEN_KIND=signed`. Database and signing settings
//! are read separately by `DatabaseConfig::from_env` and `JwtConfig::from_env`.

use auth::{TokenKind, validation::POST_TEXT_MAX_BYTES};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Default request body limit
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Smallest accepted body limit: a maximal post where every byte is escaped
/// as `\u00XX`, plus room for the JSON framing
pub const MIN_BODY_BYTES: usize = 6 * POST_TEXT_MAX_BYTES + 64 * 1024;

/// Service settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    pub cache_ttl_seconds: u64,
    pub cache_purge_interval_seconds: u64,
    /// Kind of token issued on signup and login
    pub token_kind: TokenKind,
    /// Request body limit; must fit a maximal post plus JSON framing
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Load settings from defaults and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config: Self = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("log_level", "info")?
            .set_default("cache_ttl_seconds", 300)?
            .set_default("cache_purge_interval_seconds", 60)?
            .set_default("token_kind", "opaque")?
            .set_default("max_body_bytes", DEFAULT_MAX_BODY_BYTES as u64)?
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if config.max_body_bytes < MIN_BODY_BYTES {
            warn!(
                "max_body_bytes {} is below the floor, using {}",
                config.max_body_bytes, MIN_BODY_BYTES
            );
            config.max_body_bytes = MIN_BODY_BYTES;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_purge_interval(&self) -> Duration {
        Duration::from_secs(self.cache_purge_interval_seconds.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            cache_ttl_seconds: 300,
            cache_purge_interval_seconds: 60,
            token_kind: TokenKind::Opaque,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
