//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `BOARD_MASTER` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use board_master::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod schedule;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use schedule::ScheduleConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL settings. When absent outside production the service runs
    /// on the in-memory store.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then every `BOARD_MASTER__*` variable:
    ///
    /// - `BOARD_MASTER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `BOARD_MASTER__DATABASE__URL=...` -> `database.url = ...`
    /// - `BOARD_MASTER__SCHEDULE__UTC_OFFSET_MINUTES=-300`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BOARD_MASTER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.schedule.validate()?;
        match &self.database {
            Some(database) => database.validate()?,
            None if self.is_production() => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"))
            }
            None => {}
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Environment variables are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "BOARD_MASTER__DATABASE__URL",
        "BOARD_MASTER__SERVER__PORT",
        "BOARD_MASTER__SERVER__ENVIRONMENT",
        "BOARD_MASTER__SCHEDULE__UTC_OFFSET_MINUTES",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_nested_values_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("BOARD_MASTER__DATABASE__URL", "postgresql://test@localhost/board");
        env::set_var("BOARD_MASTER__SERVER__PORT", "9090");
        env::set_var("BOARD_MASTER__SCHEDULE__UTC_OFFSET_MINUTES", "-300");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.schedule.utc_offset_minutes, -300);
        assert_eq!(
            config.database.unwrap().url,
            "postgresql://test@localhost/board"
        );
    }

    #[test]
    fn missing_database_is_fine_outside_production() {
        let config = AppConfig::default();
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_requires_database() {
        let mut config = AppConfig::default();
        config.server.environment = Environment::Production;
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        );
    }
}
