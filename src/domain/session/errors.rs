//! Authorization errors raised by the ledger's session checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::ErrorCode;

use super::ActionCategory;

/// Rejections produced by the session program on either venue.
///
/// These are always fatal to the workflow phase that triggered them and are
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationError {
    #[error("Unauthorized: signer is not the registered session key")]
    UnauthorizedKey,

    #[error("Session has expired")]
    Expired,

    #[error("Session is not active")]
    Inactive,

    #[error("Strategy not enabled for this session: {category}")]
    StrategyNotEnabled { category: ActionCategory },

    #[error("Action amount {requested} exceeds exposure cap ({spent}/{max} already spent)")]
    ExposureLimitExceeded { requested: u64, spent: u64, max: u64 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Range low {low} must be <= range high {high}")]
    InvalidRange { low: i32, high: i32 },
}

impl AuthorizationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthorizationError::UnauthorizedKey => ErrorCode::Unauthorized,
            AuthorizationError::Expired => ErrorCode::SessionExpired,
            AuthorizationError::Inactive => ErrorCode::SessionInactive,
            AuthorizationError::StrategyNotEnabled { .. } => ErrorCode::StrategyNotEnabled,
            AuthorizationError::ExposureLimitExceeded { .. } => ErrorCode::ExposureLimitExceeded,
            AuthorizationError::Overflow => ErrorCode::InternalError,
            AuthorizationError::InvalidRange { .. } => ErrorCode::ValidationFailed,
        }
    }
}
