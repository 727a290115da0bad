//! Position domain module - market state read from the oracle.

mod snapshot;

pub use snapshot::{FeeAmounts, PositionSnapshot};
