//! State machine trait for lifecycle enums.
//!
//! Gives lifecycle enums (workflow phases, delegation locations) one way to
//! express and check their legal transitions.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list their legal transitions and get a checked
/// `transition_to` for free.
///
/// # Example
///
/// ```ignore
/// let next = WorkflowPhase::Idle.transition_to(WorkflowPhase::ReadPosition)?;
/// assert!(WorkflowPhase::Completed.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
