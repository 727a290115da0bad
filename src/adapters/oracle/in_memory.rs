//! In-memory position oracle.
//!
//! Serves a configurable snapshot. Used for local runs without a market
//! endpoint and for tests that need to move the market pointer or make
//! the oracle fail.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::domain::position::{FeeAmounts, PositionSnapshot};
use crate::ports::{OracleError, PositionOracle};

pub struct InMemoryPositionOracle {
    state: RwLock<Result<PositionSnapshot, OracleError>>,
}

impl InMemoryPositionOracle {
    pub fn new(snapshot: PositionSnapshot) -> Self {
        Self {
            state: RwLock::new(Ok(snapshot)),
        }
    }

    pub async fn set_snapshot(&self, snapshot: PositionSnapshot) {
        *self.state.write().await = Ok(snapshot);
    }

    /// Moves the market pointer, keeping range and fees. No effect while
    /// the oracle is failing.
    pub async fn set_market_pointer(&self, market_pointer: i32) {
        if let Ok(snapshot) = self.state.write().await.as_mut() {
            snapshot.market_pointer = market_pointer;
        }
    }

    pub async fn set_fees(&self, fees: FeeAmounts) {
        if let Ok(snapshot) = self.state.write().await.as_mut() {
            snapshot.fees = fees;
        }
    }

    /// Every subsequent read fails with `error` until a snapshot is set again.
    pub async fn fail_with(&self, error: OracleError) {
        *self.state.write().await = Err(error);
    }
}

#[async_trait]
impl PositionOracle for InMemoryPositionOracle {
    async fn snapshot(&self) -> Result<PositionSnapshot, OracleError> {
        let mut snapshot = self.state.read().await.clone()?;
        snapshot.observed_at = Timestamp::now();
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> InMemoryPositionOracle {
        InMemoryPositionOracle::new(
            PositionSnapshot::new(-10, 10, 0, FeeAmounts::new(1, 2), Timestamp::now()).unwrap(),
        )
    }

    #[tokio::test]
    async fn moving_pointer_changes_in_range() {
        let oracle = oracle();
        assert!(oracle.snapshot().await.unwrap().in_range());

        oracle.set_market_pointer(11).await;
        let snapshot = oracle.snapshot().await.unwrap();
        assert_eq!(snapshot.market_pointer, 11);
        assert!(!snapshot.in_range());
    }

    #[tokio::test]
    async fn failure_persists_until_snapshot_is_set() {
        let oracle = oracle();
        oracle
            .fail_with(OracleError::Unavailable("down".into()))
            .await;
        assert!(oracle.snapshot().await.is_err());
        oracle.set_market_pointer(3).await;
        assert!(oracle.snapshot().await.is_err());

        oracle
            .set_snapshot(
                PositionSnapshot::new(0, 5, 3, FeeAmounts::default(), Timestamp::now()).unwrap(),
            )
            .await;
        assert_eq!(oracle.snapshot().await.unwrap().market_pointer, 3);
    }
}
