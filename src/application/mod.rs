//! Application layer - workflows and background services.
//!
//! Coordinates the domain through ports:
//! - `ActionTrigger` gates and launches action workflows
//! - `DelegationOrchestrator` runs the five phases of one workflow
//! - `PeriodicMonitor` checkpoints position status on a fixed cadence
//! - `ProgressBus` fans progress out to any number of subscribers
//! - `provision_session` creates the session and monitor before either runs

mod binding;
mod errors;
mod gate;
mod monitor;
mod orchestrator;
mod progress;
mod provisioning;
mod reconciliation;
mod retry;
mod trigger;
mod verification;

pub use binding::SessionBinding;
pub use errors::WorkflowError;
pub use gate::{ConcurrencyGate, GateGuard};
pub use monitor::{MonitorConfig, PeriodicMonitor};
pub use orchestrator::{
    DelegationOrchestrator, OrchestratorConfig, ALREADY_DELEGATED_DETAIL,
    CHECKPOINT_DEFERRED_DETAIL,
};
pub use progress::{
    ProgressBus, ProgressEvent, ReconciledEvent, TickEvent, TickPosition, DEFAULT_BUS_CAPACITY,
};
pub use provisioning::{provision_session, Provisioned, SessionTerms};
pub use reconciliation::{
    DeferredCheckpoint, DeferredCheckpoints, LocationInspector, ReconciliationOutcome,
    ReconciliationPoller,
};
pub use retry::{BoundedRetry, Probe, RetryOutcome};
pub use trigger::{ActionTrigger, TriggerOutcome};
pub use verification::SubmissionVerifier;
