//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
///
/// These are the machine-readable codes carried on the push channel so a
/// client can render a failure without reading server logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Authorization errors (raised by the ledger)
    Unauthorized,
    SessionExpired,
    SessionInactive,
    StrategyNotEnabled,
    ExposureLimitExceeded,

    // Execution errors
    SilentInstructionFailure,
    TransportFailure,
    OracleUnavailable,

    // Push channel errors
    AuthenticationRequired,
    RateLimited,
    InvalidMessage,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::SessionInactive => "SESSION_INACTIVE",
            ErrorCode::StrategyNotEnabled => "STRATEGY_NOT_ENABLED",
            ErrorCode::ExposureLimitExceeded => "EXPOSURE_LIMIT_EXCEEDED",
            ErrorCode::SilentInstructionFailure => "SILENT_INSTRUCTION_FAILURE",
            ErrorCode::TransportFailure => "TRANSPORT_FAILURE",
            ErrorCode::OracleUnavailable => "ORACLE_UNAVAILABLE",
            ErrorCode::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InvalidMessage => "INVALID_MESSAGE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
