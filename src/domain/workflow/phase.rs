//! Phases of an action workflow.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Workflow state. The five working phases run strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    ReadPosition,
    Delegate,
    ExecuteOnContext,
    CommitAndReturn,
    Checkpoint,
    Completed,
    Failed,
}

impl WorkflowPhase {
    /// The five phases that each produce a step, in execution order.
    pub const WORKING: [WorkflowPhase; 5] = [
        WorkflowPhase::ReadPosition,
        WorkflowPhase::Delegate,
        WorkflowPhase::ExecuteOnContext,
        WorkflowPhase::CommitAndReturn,
        WorkflowPhase::Checkpoint,
    ];

    /// 1-based step index, or `None` for non-working states.
    pub fn step_index(&self) -> Option<i32> {
        match self {
            WorkflowPhase::ReadPosition => Some(1),
            WorkflowPhase::Delegate => Some(2),
            WorkflowPhase::ExecuteOnContext => Some(3),
            WorkflowPhase::CommitAndReturn => Some(4),
            WorkflowPhase::Checkpoint => Some(5),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowPhase::Idle => "Idle",
            WorkflowPhase::ReadPosition => "Read position",
            WorkflowPhase::Delegate => "Delegate session",
            WorkflowPhase::ExecuteOnContext => "Execute on rollup",
            WorkflowPhase::CommitAndReturn => "Commit and return",
            WorkflowPhase::Checkpoint => "Checkpoint on ledger",
            WorkflowPhase::Completed => "Completed",
            WorkflowPhase::Failed => "Failed",
        }
    }

    /// The working phase after this one, if any.
    pub fn next(&self) -> Option<WorkflowPhase> {
        match self {
            WorkflowPhase::Idle => Some(WorkflowPhase::ReadPosition),
            WorkflowPhase::ReadPosition => Some(WorkflowPhase::Delegate),
            WorkflowPhase::Delegate => Some(WorkflowPhase::ExecuteOnContext),
            WorkflowPhase::ExecuteOnContext => Some(WorkflowPhase::CommitAndReturn),
            WorkflowPhase::CommitAndReturn => Some(WorkflowPhase::Checkpoint),
            WorkflowPhase::Checkpoint => Some(WorkflowPhase::Completed),
            WorkflowPhase::Completed | WorkflowPhase::Failed => None,
        }
    }
}

impl StateMachine for WorkflowPhase {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            WorkflowPhase::Idle => vec![WorkflowPhase::ReadPosition, WorkflowPhase::Failed],
            WorkflowPhase::Completed | WorkflowPhase::Failed => vec![],
            working => {
                let mut targets = Vec::with_capacity(2);
                if let Some(next) = working.next() {
                    targets.push(next);
                }
                targets.push(WorkflowPhase::Failed);
                targets
            }
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
