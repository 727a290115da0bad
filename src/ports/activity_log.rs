//! ActivityLog port - external append-only log of human-readable summaries.
//!
//! Downstream reasoning reads this log for fresh context, so the monitor
//! appends to it on every tick whether or not its write succeeded.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityLogError {
    #[error("Activity log I/O failed: {0}")]
    Io(String),
}

#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Appends one entry. Entries are never rewritten.
    async fn append(&self, entry: &str) -> Result<(), ActivityLogError>;
}
