//! Session domain module.
//!
//! The scoped authorization record a user grants to the device key, the
//! position monitor record checkpoints are written to, and the program rules
//! both venues enforce on them.

mod errors;
mod location;
mod monitor_record;
mod record;
mod strategy;

pub use errors::AuthorizationError;
pub use location::DelegationLocation;
pub use monitor_record::{CheckpointChange, PositionMonitorRecord, MONITOR_SEED};
pub use record::{Session, SESSION_SEED};
pub use strategy::{
    ActionCategory, StrategyMask, STRATEGY_ALL, STRATEGY_LIQUIDATION, STRATEGY_LP,
    STRATEGY_YIELD,
};
