//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the signer domain.

mod address;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use address::Address;
pub use errors::{ErrorCode, ValidationError};
pub use ids::{TxSignature, WorkflowId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
