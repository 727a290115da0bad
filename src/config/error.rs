//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address {0}")]
    InvalidBindAddress(String),

    #[error("Invalid address for {field}: {reason}")]
    InvalidAddress { field: &'static str, reason: String },

    #[error("Program and delegation program must differ")]
    ProgramsMustDiffer,

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Session TTL exceeds {max} seconds")]
    SessionTtlTooLong { max: i64 },

    #[error("Monitored range is inverted ({low} > {high})")]
    InvertedRange { low: i32, high: i32 },

    #[error("Strategy mask {0:#05b} has unknown bits")]
    UnknownStrategyBits(u8),

    #[error("Oracle endpoint must be an http(s) URL")]
    InvalidOracleEndpoint,

    #[error("Push channel requires an auth token in production")]
    PushTokenRequired,
}
