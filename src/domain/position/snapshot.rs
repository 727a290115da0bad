//! Read-only view of a monitored position at one instant.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Accrued but unclaimed fees on both sides of the pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmounts {
    pub x: u64,
    pub y: u64,
}

impl FeeAmounts {
    pub fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for FeeAmounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={} y={}", self.x, self.y)
    }
}

/// Snapshot returned by the position oracle. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub range_low: i32,
    pub range_high: i32,
    pub market_pointer: i32,
    pub fees: FeeAmounts,
    pub observed_at: Timestamp,
}

impl PositionSnapshot {
    pub fn new(
        range_low: i32,
        range_high: i32,
        market_pointer: i32,
        fees: FeeAmounts,
        observed_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if range_low > range_high {
            return Err(ValidationError::invalid_format(
                "range",
                format!("low {} is above high {}", range_low, range_high),
            ));
        }
        Ok(Self {
            range_low,
            range_high,
            market_pointer,
            fees,
            observed_at,
        })
    }

    /// Whether the market pointer sits inside the position's range (inclusive).
    pub fn in_range(&self) -> bool {
        self.market_pointer >= self.range_low && self.market_pointer <= self.range_high
    }

    /// Distance from the pointer to the nearest range edge; zero when in range.
    pub fn distance_outside(&self) -> u32 {
        if self.market_pointer < self.range_low {
            self.range_low.abs_diff(self.market_pointer)
        } else if self.market_pointer > self.range_high {
            self.market_pointer.abs_diff(self.range_high)
        } else {
            0
        }
    }

    /// One-line human-readable description used in activity logs.
    pub fn describe(&self) -> String {
        let placement = if self.in_range() {
            "in range".to_string()
        } else {
            format!("OUT OF RANGE by {}", self.distance_outside())
        };
        format!(
            "pointer {} {} [{}, {}], fees {}",
            self.market_pointer, placement, self.range_low, self.range_high, self.fees
        )
    }
}
