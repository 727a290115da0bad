//! Per-phase step records and the outbound step event.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::WorkflowId;

use super::WorkflowPhase;

/// Step index used for a failure caught at the workflow boundary.
pub const ABORTED_STEP_INDEX: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Success,
    Error,
}

/// Outcome of one workflow phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: i32,
    pub label: String,
    pub status: StepStatus,
    pub reference: Option<String>,
    pub detail: Option<String>,
}

impl Step {
    fn for_phase(phase: WorkflowPhase, status: StepStatus) -> Self {
        Self {
            index: phase.step_index().unwrap_or(ABORTED_STEP_INDEX),
            label: phase.label().to_string(),
            status,
            reference: None,
            detail: None,
        }
    }

    pub fn pending(phase: WorkflowPhase) -> Self {
        Self::for_phase(phase, StepStatus::Pending)
    }

    pub fn success(phase: WorkflowPhase) -> Self {
        Self::for_phase(phase, StepStatus::Success)
    }

    pub fn error(phase: WorkflowPhase, detail: impl Into<String>) -> Self {
        Self::for_phase(phase, StepStatus::Error).with_detail(detail)
    }

    /// Terminal error for a failure that escaped every phase.
    pub fn aborted(detail: impl Into<String>) -> Self {
        Self {
            index: ABORTED_STEP_INDEX,
            label: "Workflow aborted".to_string(),
            status: StepStatus::Error,
            reference: None,
            detail: Some(detail.into()),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == StepStatus::Error
    }
}

/// Step as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    pub workflow_id: WorkflowId,
    pub step_index: i32,
    pub total_steps: usize,
    pub label: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepEvent {
    pub fn new(workflow_id: WorkflowId, total_steps: usize, step: Step) -> Self {
        Self {
            workflow_id,
            step_index: step.index,
            total_steps,
            label: step.label,
            status: step.status,
            reference: step.reference,
            detail: step.detail,
        }
    }
}
