//! ActionWorkflow - the in-memory record of one triggered action.
//!
//! Created when a trigger wins the gate and dropped as soon as its terminal
//! step has been emitted. Never persisted.

use crate::domain::foundation::{StateMachine, ValidationError, WorkflowId};
use crate::domain::session::ActionCategory;

use super::{Step, StepEvent, WorkflowPhase};

#[derive(Debug, Clone)]
pub struct ActionWorkflow {
    id: WorkflowId,
    category: ActionCategory,
    phase: WorkflowPhase,
    steps: Vec<Step>,
}

impl ActionWorkflow {
    pub fn new(id: WorkflowId, category: ActionCategory) -> Self {
        Self {
            id,
            category,
            phase: WorkflowPhase::Idle,
            steps: WorkflowPhase::WORKING.iter().map(|p| Step::pending(*p)).collect(),
        }
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn category(&self) -> ActionCategory {
        self.category
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn total(&self) -> usize {
        WorkflowPhase::WORKING.len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Moves into the next working phase.
    pub fn begin(&mut self, phase: WorkflowPhase) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(phase)?;
        Ok(())
    }

    /// Records the outcome of the current phase and returns the event to publish.
    ///
    /// An error step moves the workflow to `Failed`; a successful checkpoint
    /// step moves it to `Completed`.
    pub fn record(&mut self, step: Step) -> StepEvent {
        if step.is_error() {
            self.phase = WorkflowPhase::Failed;
        } else if self.phase == WorkflowPhase::Checkpoint {
            self.phase = WorkflowPhase::Completed;
        }

        match self.steps.iter_mut().find(|s| s.index == step.index) {
            Some(slot) => *slot = step.clone(),
            None => self.steps.push(step.clone()),
        }

        StepEvent::new(self.id, self.total(), step)
    }
}
