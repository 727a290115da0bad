//! Venue and session configuration
//!
//! Identifies the programs, the owner and the device key, plus the
//! parameters used when the session is bootstrapped on the simulated
//! network at startup.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::venue::SimulationConfig;
use crate::application::SessionBinding;
use crate::domain::foundation::Address;
use crate::domain::session::{StrategyMask, STRATEGY_ALL};

/// Longest session a deployment may grant (one year).
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// Program owning session and monitor records
    #[serde(default = "default_program_id")]
    pub program_id: String,

    /// Program holding ownership while a record is delegated
    #[serde(default = "default_delegation_program_id")]
    pub delegation_program_id: String,

    /// Wallet that owns the session
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Unattended signer the session is granted to
    #[serde(default = "default_device_key")]
    pub device_key: String,

    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,

    /// Cumulative exposure cap for the session
    #[serde(default = "default_max_exposure")]
    pub max_exposure: u64,

    /// Bitmask of permitted action categories
    #[serde(default = "default_strategy_mask")]
    pub strategy_mask: u8,

    /// Lower bound of the monitored range
    #[serde(default = "default_range_low")]
    pub range_low: i32,

    /// Upper bound of the monitored range
    #[serde(default = "default_range_high")]
    pub range_high: i32,

    /// Undelegate-to-ledger propagation delay (milliseconds); unset means never
    #[serde(default = "default_propagation_delay_ms")]
    pub propagation_delay_ms: Option<u64>,

    /// Let rejected submissions land with a failed receipt
    #[serde(default)]
    pub skip_preflight: bool,
}

impl VenueConfig {
    pub fn binding(&self) -> Result<SessionBinding, ValidationError> {
        Ok(SessionBinding::derive(
            &parse_address("venue.program_id", &self.program_id)?,
            parse_address("venue.delegation_program_id", &self.delegation_program_id)?,
            parse_address("venue.owner", &self.owner)?,
            parse_address("venue.device_key", &self.device_key)?,
        ))
    }

    pub fn simulation_config(&self) -> Result<SimulationConfig, ValidationError> {
        Ok(SimulationConfig {
            program_id: parse_address("venue.program_id", &self.program_id)?,
            delegation_program_id: parse_address(
                "venue.delegation_program_id",
                &self.delegation_program_id,
            )?,
            propagation_delay: self.propagation_delay_ms.map(Duration::from_millis),
            skip_preflight: self.skip_preflight,
        })
    }

    pub fn strategy_mask(&self) -> StrategyMask {
        StrategyMask::new(self.strategy_mask)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.binding()?;
        if self.program_id == self.delegation_program_id {
            return Err(ValidationError::ProgramsMustDiffer);
        }
        if self.session_ttl_secs <= 0 {
            return Err(ValidationError::MustBePositive("venue.session_ttl_secs"));
        }
        if self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ValidationError::SessionTtlTooLong {
                max: MAX_SESSION_TTL_SECS,
            });
        }
        if self.max_exposure == 0 {
            return Err(ValidationError::MustBePositive("venue.max_exposure"));
        }
        if self.strategy_mask & !STRATEGY_ALL != 0 {
            return Err(ValidationError::UnknownStrategyBits(self.strategy_mask));
        }
        if self.range_low > self.range_high {
            return Err(ValidationError::InvertedRange {
                low: self.range_low,
                high: self.range_high,
            });
        }
        Ok(())
    }
}

fn parse_address(field: &'static str, raw: &str) -> Result<Address, ValidationError> {
    Address::new(raw).map_err(|e| ValidationError::InvalidAddress {
        field,
        reason: e.to_string(),
    })
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            delegation_program_id: default_delegation_program_id(),
            owner: default_owner(),
            device_key: default_device_key(),
            session_ttl_secs: default_session_ttl_secs(),
            max_exposure: default_max_exposure(),
            strategy_mask: default_strategy_mask(),
            range_low: default_range_low(),
            range_high: default_range_high(),
            propagation_delay_ms: default_propagation_delay_ms(),
            skip_preflight: false,
        }
    }
}

fn default_program_id() -> String {
    "AgentSess1onProgram11111111111111111111111".to_string()
}

fn default_delegation_program_id() -> String {
    "DELeGGvXpWV2fqJUhqcF5ZSYMS4JTLjteaAMARRSaeSh".to_string()
}

fn default_owner() -> String {
    "OwnerWa11et111111111111111111111111111111111".to_string()
}

fn default_device_key() -> String {
    "DeviceKey1111111111111111111111111111111111".to_string()
}

fn default_session_ttl_secs() -> i64 {
    86_400
}

fn default_max_exposure() -> u64 {
    1_000_000_000
}

fn default_strategy_mask() -> u8 {
    STRATEGY_ALL
}

fn default_range_low() -> i32 {
    -100
}

fn default_range_high() -> i32 {
    100
}

fn default_propagation_delay_ms() -> Option<u64> {
    Some(4_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = VenueConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy_mask(), StrategyMask::all());
    }

    #[test]
    fn binding_derives_session_from_owner() {
        let config = VenueConfig::default();
        let a = config.binding().unwrap();
        let b = config.binding().unwrap();
        assert_eq!(a.session, b.session);
        assert_eq!(a.owner.as_str(), config.owner);
    }

    #[test]
    fn blank_device_key_is_rejected() {
        let config = VenueConfig {
            device_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidAddress {
                field: "venue.device_key",
                ..
            })
        ));
    }

    #[test]
    fn ttl_beyond_a_year_is_rejected() {
        let config = VenueConfig {
            session_ttl_secs: i64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SessionTtlTooLong {
                max: MAX_SESSION_TTL_SECS
            })
        );
    }

    #[test]
    fn identical_programs_are_rejected() {
        let config = VenueConfig {
            delegation_program_id: default_program_id(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ProgramsMustDiffer));
    }

    #[test]
    fn unknown_strategy_bits_are_rejected() {
        let config = VenueConfig {
            strategy_mask: 0b1000,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnknownStrategyBits(0b1000))
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = VenueConfig {
            range_low: 10,
            range_high: -10,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn simulation_carries_propagation_delay() {
        let sim = VenueConfig::default().simulation_config().unwrap();
        assert_eq!(sim.propagation_delay, Some(Duration::from_secs(4)));
        assert!(!sim.skip_preflight);
    }
}
