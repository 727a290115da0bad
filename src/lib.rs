//! Autosigner - unattended delegated signing
//!
//! Moves a scoped authorization session from a durable ledger to an ephemeral
//! rollup, executes one action there, returns ownership and reconciles the
//! result back on the ledger. A periodic monitor checkpoints position status
//! and completes any reconciliation a workflow had to defer.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
