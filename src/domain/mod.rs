//! Domain layer - records, rules and value objects.

pub mod foundation;
pub mod position;
pub mod session;
pub mod workflow;
