//! Position oracle configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::foundation::{Timestamp, ValidationError as DomainValidationError};
use crate::domain::position::{FeeAmounts, PositionSnapshot};

/// Where position snapshots come from.
///
/// With an `endpoint` the HTTP oracle is used; otherwise a static snapshot
/// built from the remaining fields is served from memory.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    pub endpoint: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_range_low")]
    pub range_low: i32,

    #[serde(default = "default_range_high")]
    pub range_high: i32,

    #[serde(default)]
    pub market_pointer: i32,

    #[serde(default)]
    pub fee_x: u64,

    #[serde(default)]
    pub fee_y: u64,
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn static_snapshot(&self) -> Result<PositionSnapshot, DomainValidationError> {
        PositionSnapshot::new(
            self.range_low,
            self.range_high,
            self.market_pointer,
            FeeAmounts::new(self.fee_x, self.fee_y),
            Timestamp::now(),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ValidationError::InvalidOracleEndpoint);
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("oracle.timeout_secs"));
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

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            range_low: default_range_low(),
            range_high: default_range_high(),
            market_pointer: 0,
            fee_x: 0,
            fee_y: 0,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_range_low() -> i32 {
    -100
}

fn default_range_high() -> i32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_snapshot_is_in_range_by_default() {
        let snapshot = OracleConfig::default().static_snapshot().unwrap();
        assert!(snapshot.in_range());
    }

    #[test]
    fn endpoint_must_be_http() {
        let config = OracleConfig {
            endpoint: Some("ftp://oracle.local/position".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidOracleEndpoint));

        let config = OracleConfig {
            endpoint: Some("https://oracle.local/position".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
