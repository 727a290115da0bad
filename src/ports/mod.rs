//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `SessionVenue` - The durable ledger and the ephemeral rollup
//! - `PositionOracle` - Read-only market state
//! - `ActivityLog` - Append-only summaries for downstream reasoning

mod activity_log;
mod position_oracle;
mod session_venue;

pub use activity_log::{ActivityLog, ActivityLogError};
pub use position_oracle::{OracleError, PositionOracle};
pub use session_venue::{Receipt, SessionOperation, SessionVenue, VenueError, VenueKind};
