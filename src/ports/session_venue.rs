//! SessionVenue port - the durable ledger and the ephemeral rollup.
//!
//! Both execution surfaces expose the same operations over the session
//! record. One instance is wired as the durable ledger, another as the
//! rollup. Enforcement of keys, expiry, strategy and exposure happens behind
//! this port; callers never re-validate locally.
//!
//! Submitting an operation only means it was accepted for inclusion. Callers
//! must fetch the [`Receipt`] and inspect `instruction_error` to learn whether
//! the operation actually took effect.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{Address, TxSignature};
use crate::domain::position::FeeAmounts;
use crate::domain::session::{ActionCategory, AuthorizationError, Session, StrategyMask};

/// Which execution surface a venue represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Ledger,
    Rollup,
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueKind::Ledger => f.write_str("ledger"),
            VenueKind::Rollup => f.write_str("rollup"),
        }
    }
}

/// Operations accepted by the session program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SessionOperation {
    /// Owner-signed. Creates the session record.
    CreateSession {
        device_key: Address,
        ttl_secs: i64,
        max_exposure: u64,
        strategy_mask: StrategyMask,
    },
    /// Owner-signed. Creates the position monitor record for the session.
    RegisterMonitor { range_low: i32, range_high: i32 },
    /// Moves record ownership to the delegation program.
    Delegate { owner: Address },
    /// Device-signed. Spends exposure for one scoped action.
    ExecuteAction {
        category: ActionCategory,
        amount: u64,
    },
    /// Device-signed. Syncs rollup state to the ledger without relinquishing.
    Commit,
    /// Device-signed. Schedules ownership return to the ledger.
    Undelegate,
    /// Device-signed. Writes the latest observed position status.
    CheckpointStatus { market_pointer: i32, fees: FeeAmounts },
    /// Owner-signed. Terminally deactivates the session.
    Revoke,
}

impl SessionOperation {
    pub fn name(&self) -> &'static str {
        match self {
            SessionOperation::CreateSession { .. } => "create_session",
            SessionOperation::RegisterMonitor { .. } => "register_monitor",
            SessionOperation::Delegate { .. } => "delegate",
            SessionOperation::ExecuteAction { .. } => "execute_action",
            SessionOperation::Commit => "commit",
            SessionOperation::Undelegate => "undelegate",
            SessionOperation::CheckpointStatus { .. } => "checkpoint_status",
            SessionOperation::Revoke => "revoke",
        }
    }
}

/// Execution receipt for a landed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub signature: TxSignature,
    pub slot: u64,
    /// Set when the transaction landed but its instruction failed.
    pub instruction_error: Option<String>,
    pub logs: Vec<String>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.instruction_error.is_none()
    }
}

/// Errors returned by a venue when an operation is refused outright or the
/// venue cannot be reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    #[error("{0}")]
    Rejected(#[from] AuthorizationError),

    #[error("Account {0} not found")]
    AccountNotFound(Address),

    #[error("Account {0} is delegated and cannot be written on the ledger")]
    AccountDelegated(Address),

    #[error("Account {0} is not delegated to the rollup")]
    NotDelegated(Address),

    #[error("Account {0} already exists")]
    AlreadyExists(Address),

    #[error("Operation {0} is not supported on this venue")]
    Unsupported(&'static str),

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl VenueError {
    pub fn transport(message: impl Into<String>) -> Self {
        VenueError::Transport(message.into())
    }
}

/// Port for one execution surface of the session program.
#[async_trait]
pub trait SessionVenue: Send + Sync {
    /// Which surface this is.
    fn kind(&self) -> VenueKind;

    /// Submits `operation` against the session record at `session`.
    ///
    /// `Ok` means accepted for inclusion, not that the instruction succeeded.
    async fn submit(
        &self,
        session: &Address,
        operation: SessionOperation,
        signer: &Address,
    ) -> Result<TxSignature, VenueError>;

    /// Fetches the receipt of a submitted transaction, `None` if not yet landed.
    async fn receipt(&self, signature: &TxSignature) -> Result<Option<Receipt>, VenueError>;

    /// Raw owner program of an account as seen by this venue.
    async fn account_owner(&self, account: &Address) -> Result<Option<Address>, VenueError>;

    /// Reads the session record as seen by this venue.
    async fn fetch_session(&self, session: &Address) -> Result<Option<Session>, VenueError>;
}
