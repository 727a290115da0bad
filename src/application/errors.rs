//! Errors raised while driving an action workflow or a monitor tick.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, TxSignature, ValidationError};
use crate::domain::session::AuthorizationError;
use crate::ports::{OracleError, VenueError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Rejected by the session program. Never retried.
    #[error("{0}")]
    Authorization(AuthorizationError),

    #[error("{0}")]
    Oracle(#[from] OracleError),

    #[error("{0}")]
    Venue(VenueError),

    /// The transaction landed but its instruction failed.
    #[error("{operation} ({signature}) failed on-chain: {reason}")]
    SilentFailure {
        operation: &'static str,
        signature: TxSignature,
        reason: String,
    },

    #[error("No receipt for {signature} after {attempts} attempts")]
    ReceiptUnavailable {
        signature: TxSignature,
        attempts: u32,
    },

    #[error("Internal workflow error: {0}")]
    Internal(String),
}

impl WorkflowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::Authorization(err) => err.code(),
            WorkflowError::Oracle(_) => ErrorCode::OracleUnavailable,
            WorkflowError::Venue(_) | WorkflowError::ReceiptUnavailable { .. } => {
                ErrorCode::TransportFailure
            }
            WorkflowError::SilentFailure { .. } => ErrorCode::SilentInstructionFailure,
            WorkflowError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<VenueError> for WorkflowError {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::Rejected(auth) => WorkflowError::Authorization(auth),
            other => WorkflowError::Venue(other),
        }
    }
}

impl From<ValidationError> for WorkflowError {
    fn from(err: ValidationError) -> Self {
        WorkflowError::Internal(err.to_string())
    }
}
