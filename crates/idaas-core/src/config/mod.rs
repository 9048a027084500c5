//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod jwt;
pub mod logging;
pub mod tokens;

use serde::Deserialize;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::jwt::{JwtAlgorithm, JwtConfig, KeyMaterialConfig};
pub use self::logging::LoggingConfig;
pub use self::tokens::{AccessLogConfig, OverflowPolicy, TokenConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay) and the
/// `IDAAS__`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Deployment environment name (`development`, `production`, ...).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Signing settings.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Token lifetimes.
    #[serde(default)]
    pub tokens: TokenConfig,
    /// Access-log recorder settings.
    #[serde(default)]
    pub access_log: AccessLogConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files in `config_dir`.
    ///
    /// Merges `default.toml`, an environment-specific overlay, an optional
    /// `local.toml`, and environment variables prefixed with `IDAAS__`.
    pub fn load(config_dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(
                config::File::with_name(&format!("{config_dir}/{env}")).required(false),
            )
            .add_source(config::File::with_name(&format!("{config_dir}/local")).required(false))
            .set_override("environment", env)?
            .add_source(
                config::Environment::with_prefix("IDAAS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Validate cross-field constraints. Any error here is fatal.
    pub fn validate(&self) -> Result<(), AppError> {
        self.jwt.validate(self.is_production())?;

        if self.database.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        if self.access_log.queue_capacity == 0 {
            return Err(AppError::configuration(
                "access_log.queue_capacity must be greater than zero",
            ));
        }
        self.tokens.validate()
    }
}

fn default_environment() -> String {
    "development".to_string()
}
