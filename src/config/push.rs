//! Push channel configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::application::DEFAULT_BUS_CAPACITY;

#[derive(Debug, Deserialize)]
pub struct PushConfig {
    /// Shared token clients must present before receiving events or triggering
    pub auth_token: Option<SecretString>,

    /// Accepted triggers per connection per minute
    #[serde(default = "default_triggers_per_minute")]
    pub triggers_per_minute: u32,

    /// Progress bus buffer; slower subscribers lag and skip events
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl PushConfig {
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.triggers_per_minute == 0 {
            return Err(ValidationError::MustBePositive("push.triggers_per_minute"));
        }
        if self.channel_capacity == 0 {
            return Err(ValidationError::MustBePositive("push.channel_capacity"));
        }
        if *environment == Environment::Production && self.auth_token.is_none() {
            return Err(ValidationError::PushTokenRequired);
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            triggers_per_minute: default_triggers_per_minute(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_triggers_per_minute() -> u32 {
    6
}

fn default_channel_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_channel_is_fine_in_development() {
        assert!(PushConfig::default()
            .validate(&Environment::Development)
            .is_ok());
    }

    #[test]
    fn production_requires_a_token() {
        assert_eq!(
            PushConfig::default().validate(&Environment::Production),
            Err(ValidationError::PushTokenRequired)
        );

        let config = PushConfig {
            auth_token: Some(SecretString::new("token".to_string())),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let config = PushConfig {
            auth_token: Some(SecretString::new("hunter2".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
