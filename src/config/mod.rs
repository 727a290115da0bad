//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `AUTOSIGNER` prefix and
//! nested values are separated by double underscores.
//!
//! Every section has working defaults, so a bare environment starts a local
//! simulated deployment.
//!
//! # Example
//!
//! ```no_run
//! use autosigner::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod monitor;
mod oracle;
mod orchestrator;
mod push;
mod server;
mod venue;

pub use error::{ConfigError, ValidationError};
pub use monitor::MonitoringConfig;
pub use oracle::OracleConfig;
pub use orchestrator::WorkflowConfig;
pub use push::PushConfig;
pub use server::{Environment, ServerConfig};
pub use venue::{VenueConfig, MAX_SESSION_TTL_SECS};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Delegated action workflow timing
    #[serde(default)]
    pub orchestrator: WorkflowConfig,

    /// Periodic monitor cadence and activity log
    #[serde(default)]
    pub monitor: MonitoringConfig,

    /// Programs, keys and session parameters
    #[serde(default)]
    pub venue: VenueConfig,

    /// Position oracle source
    #[serde(default)]
    pub oracle: OracleConfig,

    /// WebSocket push channel
    #[serde(default)]
    pub push: PushConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `AUTOSIGNER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `AUTOSIGNER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `AUTOSIGNER__MONITOR__INTERVAL_SECS=10` -> `monitor.interval_secs = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("AUTOSIGNER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.orchestrator.validate()?;
        self.monitor.validate()?;
        self.venue.validate()?;
        self.oracle.validate()?;
        self.push.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("AUTOSIGNER__SERVER__PORT");
        env::remove_var("AUTOSIGNER__SERVER__ENVIRONMENT");
        env::remove_var("AUTOSIGNER__MONITOR__INTERVAL_SECS");
        env::remove_var("AUTOSIGNER__PUSH__AUTH_TOKEN");
        env::remove_var("AUTOSIGNER__VENUE__PROPAGATION_DELAY_MS");
    }

    #[test]
    fn test_load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.monitor.interval_secs, 30);
        assert_eq!(config.orchestrator.max_poll_attempts, 15);
        assert!(config.push.auth_token.is_none());
    }

    #[test]
    fn test_defaults_validate() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AUTOSIGNER__SERVER__PORT", "3000");
        env::set_var("AUTOSIGNER__MONITOR__INTERVAL_SECS", "5");
        env::set_var("AUTOSIGNER__VENUE__PROPAGATION_DELAY_MS", "250");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.monitor.interval_secs, 5);
        assert_eq!(config.venue.propagation_delay_ms, Some(250));
    }

    #[test]
    fn test_production_requires_push_token() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AUTOSIGNER__SERVER__ENVIRONMENT", "production");
        let without_token = AppConfig::load();
        env::set_var("AUTOSIGNER__PUSH__AUTH_TOKEN", "s3cret");
        let with_token = AppConfig::load();
        clear_env();

        let without_token = without_token.unwrap();
        assert!(without_token.is_production());
        assert_eq!(
            without_token.validate(),
            Err(ValidationError::PushTokenRequired)
        );

        let with_token = with_token.unwrap();
        assert!(with_token.validate().is_ok());
        assert_eq!(
            with_token
                .push
                .auth_token
                .as_ref()
                .map(|t| t.expose_secret().as_str()),
            Some("s3cret")
        );
    }
}
