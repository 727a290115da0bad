//! Checkpoint record for a monitored position.
//!
//! Registered once by the owner, then overwritten by every checkpoint the
//! device key submits on the durable ledger.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Address, Timestamp};
use crate::domain::position::FeeAmounts;

use super::AuthorizationError;

/// Seed prefix for the monitor record address.
pub const MONITOR_SEED: &[u8] = b"lp_monitor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMonitorRecord {
    pub session: Address,
    pub range_low: i32,
    pub range_high: i32,
    pub last_market_pointer: i32,
    pub in_range: bool,
    pub fees: FeeAmounts,
    pub last_checked_at: Option<Timestamp>,
}

/// In-range transition produced by a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointChange {
    pub was_in_range: bool,
    pub now_in_range: bool,
}

impl CheckpointChange {
    /// True when the position just left its range.
    pub fn left_range(&self) -> bool {
        self.was_in_range && !self.now_in_range
    }
}

impl PositionMonitorRecord {
    /// Registers a range. Starts optimistically in range until the first checkpoint.
    pub fn register(
        session: Address,
        range_low: i32,
        range_high: i32,
    ) -> Result<Self, AuthorizationError> {
        if range_low > range_high {
            return Err(AuthorizationError::InvalidRange {
                low: range_low,
                high: range_high,
            });
        }
        Ok(Self {
            session,
            range_low,
            range_high,
            last_market_pointer: 0,
            in_range: true,
            fees: FeeAmounts::default(),
            last_checked_at: None,
        })
    }

    pub fn address_for(program: &Address, session: &Address) -> Address {
        Address::derive(program, &[MONITOR_SEED, session.as_bytes()])
    }

    pub fn contains(&self, market_pointer: i32) -> bool {
        market_pointer >= self.range_low && market_pointer <= self.range_high
    }

    pub fn apply_checkpoint(
        &mut self,
        market_pointer: i32,
        fees: FeeAmounts,
        now: Timestamp,
    ) -> CheckpointChange {
        let was_in_range = self.in_range;
        let now_in_range = self.contains(market_pointer);
        self.last_market_pointer = market_pointer;
        self.in_range = now_in_range;
        self.fees = fees;
        self.last_checked_at = Some(now);
        CheckpointChange {
            was_in_range,
            now_in_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PositionMonitorRecord {
        PositionMonitorRecord::register(Address::new("session").unwrap(), -10, 10).unwrap()
    }

    #[test]
    fn register_rejects_inverted_range() {
        let err = PositionMonitorRecord::register(Address::new("s").unwrap(), 5, 4).unwrap_err();
        assert_eq!(err, AuthorizationError::InvalidRange { low: 5, high: 4 });
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let r = record();
        assert!(r.contains(-10));
        assert!(r.contains(10));
        assert!(!r.contains(11));
    }

    #[test]
    fn checkpoint_reports_leaving_range() {
        let mut r = record();
        let change = r.apply_checkpoint(25, FeeAmounts::new(3, 4), Timestamp::from_unix_secs(10));
        assert!(change.left_range());
        assert_eq!(r.last_market_pointer, 25);
        assert_eq!(r.fees, FeeAmounts::new(3, 4));
        assert!(!r.in_range);

        let again = r.apply_checkpoint(30, FeeAmounts::new(3, 4), Timestamp::from_unix_secs(20));
        assert!(!again.left_range());
    }
}
