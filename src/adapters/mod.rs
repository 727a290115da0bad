//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `venue` - Simulated durable ledger and rollup
//! - `oracle` - HTTP and in-memory position oracles
//! - `activity_log` - File and in-memory activity logs
//! - `websocket` - Push channel for progress and triggers

pub mod activity_log;
pub mod oracle;
pub mod venue;
pub mod websocket;

pub use activity_log::{FileActivityLog, InMemoryActivityLog};
pub use oracle::{HttpPositionOracle, InMemoryPositionOracle};
pub use venue::{SimulatedNetwork, SimulatedVenue, SimulationConfig};
pub use websocket::{push_router, PushState};
