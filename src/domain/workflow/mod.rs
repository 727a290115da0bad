//! Workflow domain module.
//!
//! Phases, steps and the ephemeral record of one action run. Knows nothing
//! about venues or transports.

mod phase;
mod step;
#[allow(clippy::module_inception)]
mod workflow;

pub use phase::WorkflowPhase;
pub use step::{Step, StepEvent, StepStatus, ABORTED_STEP_INDEX};
pub use workflow::ActionWorkflow;
