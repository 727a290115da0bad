//! PositionOracle port - read-only market state for the monitored position.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::position::PositionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("Position oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Position oracle returned an invalid snapshot: {0}")]
    InvalidResponse(String),
}

/// Port for reading the current position snapshot.
///
/// Implementations perform no writes. A failure here happens before any side
/// effect, so callers may simply report it.
#[async_trait]
pub trait PositionOracle: Send + Sync {
    async fn snapshot(&self) -> Result<PositionSnapshot, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PositionOracle) {}

    #[test]
    fn errors_display_reason() {
        let err = OracleError::Unavailable("connection refused".into());
        assert_eq!(err.to_string(), "Position oracle unavailable: connection refused");
    }
}
