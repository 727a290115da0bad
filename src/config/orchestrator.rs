//! Delegation workflow configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{BoundedRetry, OrchestratorConfig};

/// Timing and sizing of one delegated action workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Exposure spent by every triggered action
    #[serde(default = "default_action_amount")]
    pub action_amount: u64,

    /// Pause after delegation before executing on the rollup (milliseconds)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Interval between ownership-return checks (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Ownership-return checks before the checkpoint is deferred
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Interval between receipt fetches (milliseconds)
    #[serde(default = "default_receipt_interval_ms")]
    pub receipt_interval_ms: u64,

    /// Receipt fetches before a submission is declared unconfirmed
    #[serde(default = "default_receipt_attempts")]
    pub receipt_attempts: u32,
}

impl WorkflowConfig {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            action_amount: self.action_amount,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            reconciliation: BoundedRetry::new(
                Duration::from_millis(self.poll_interval_ms),
                self.max_poll_attempts,
            ),
            receipts: self.receipt_retry(),
        }
    }

    pub fn receipt_retry(&self) -> BoundedRetry {
        BoundedRetry::new(
            Duration::from_millis(self.receipt_interval_ms),
            self.receipt_attempts,
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.action_amount == 0 {
            return Err(ValidationError::MustBePositive("orchestrator.action_amount"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::MustBePositive("orchestrator.poll_interval_ms"));
        }
        if self.max_poll_attempts == 0 {
            return Err(ValidationError::MustBePositive("orchestrator.max_poll_attempts"));
        }
        if self.receipt_interval_ms == 0 {
            return Err(ValidationError::MustBePositive(
                "orchestrator.receipt_interval_ms",
            ));
        }
        if self.receipt_attempts == 0 {
            return Err(ValidationError::MustBePositive("orchestrator.receipt_attempts"));
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            action_amount: default_action_amount(),
            settle_delay_ms: default_settle_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            receipt_interval_ms: default_receipt_interval_ms(),
            receipt_attempts: default_receipt_attempts(),
        }
    }
}

fn default_action_amount() -> u64 {
    1_000
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_max_poll_attempts() -> u32 {
    15
}

fn default_receipt_interval_ms() -> u64 {
    250
}

fn default_receipt_attempts() -> u32 {
    20
}
