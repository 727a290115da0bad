//! DelegationOrchestrator - runs one action workflow end to end.
//!
//! ```text
//!   ReadPosition ─▶ Delegate ─▶ ExecuteOnContext ─▶ CommitAndReturn ─▶ Checkpoint
//!        │              │              │                   │               │
//!        └──────────────┴──── error ───┴───────────────────┘        pending return
//!                       ▼                                                  ▼
//!                    Failed                                  success, deferred to monitor
//! ```
//!
//! Exactly one step is published per phase, when the phase resolves. An error
//! in phases 1-4 stops the workflow. Phase 5 never fails on a slow ownership
//! return; it hands the checkpoint to the periodic monitor instead.
//!
//! The orchestrator knows nothing about transports. It publishes to the
//! [`ProgressBus`] and returns the finished workflow.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::WorkflowId;
use crate::domain::position::PositionSnapshot;
use crate::domain::session::ActionCategory;
use crate::domain::workflow::{ActionWorkflow, Step, WorkflowPhase};
use crate::ports::{PositionOracle, SessionOperation, SessionVenue};

use super::binding::SessionBinding;
use super::progress::{ProgressBus, ProgressEvent};
use super::reconciliation::{
    DeferredCheckpoints, LocationInspector, ReconciliationOutcome, ReconciliationPoller,
};
use super::retry::BoundedRetry;
use super::verification::SubmissionVerifier;
use super::WorkflowError;

/// Detail attached to a phase-2 no-op.
pub const ALREADY_DELEGATED_DETAIL: &str = "Session already delegated to the rollup; skipped";

/// Detail attached to a phase-5 soft success.
pub const CHECKPOINT_DEFERRED_DETAIL: &str =
    "Base-ledger propagation pending; the periodic monitor will complete the checkpoint";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Amount spent by every triggered action.
    pub action_amount: u64,
    /// Pause after a confirmed delegation before executing on the rollup.
    pub settle_delay: Duration,
    /// Ownership-return polling for phase 5.
    pub reconciliation: BoundedRetry,
    /// Receipt polling for every signed submission.
    pub receipts: BoundedRetry,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            action_amount: 1_000,
            settle_delay: Duration::from_secs(2),
            reconciliation: BoundedRetry::new(Duration::from_secs(2), 15),
            receipts: BoundedRetry::new(Duration::from_millis(250), 20),
        }
    }
}

pub struct DelegationOrchestrator {
    oracle: Arc<dyn PositionOracle>,
    ledger: Arc<dyn SessionVenue>,
    rollup: Arc<dyn SessionVenue>,
    bus: ProgressBus,
    binding: SessionBinding,
    inspector: LocationInspector,
    poller: ReconciliationPoller,
    verifier: SubmissionVerifier,
    deferred: DeferredCheckpoints,
    config: OrchestratorConfig,
}

impl DelegationOrchestrator {
    pub fn new(
        oracle: Arc<dyn PositionOracle>,
        ledger: Arc<dyn SessionVenue>,
        rollup: Arc<dyn SessionVenue>,
        bus: ProgressBus,
        binding: SessionBinding,
        deferred: DeferredCheckpoints,
        config: OrchestratorConfig,
    ) -> Self {
        let inspector = LocationInspector::new(ledger.clone(), binding.delegation_program.clone());
        let poller = ReconciliationPoller::new(inspector.clone(), config.reconciliation);
        Self {
            oracle,
            ledger,
            rollup,
            bus,
            binding,
            inspector,
            poller,
            verifier: SubmissionVerifier::new(config.receipts),
            deferred,
            config,
        }
    }

    pub fn binding(&self) -> &SessionBinding {
        &self.binding
    }

    /// Runs every phase of one workflow and returns it in a terminal state.
    pub async fn run(&self, id: WorkflowId, category: ActionCategory) -> ActionWorkflow {
        let mut workflow = ActionWorkflow::new(id, category);
        tracing::info!(workflow_id = %id, category = %category, "Workflow started");

        match self.drive(&mut workflow).await {
            Ok(()) => {
                tracing::info!(workflow_id = %id, "Workflow completed");
            }
            // Phase errors have already been published as their step.
            Err(err) if workflow.is_finished() => {
                tracing::warn!(
                    workflow_id = %id,
                    phase = ?workflow.steps().iter().find(|s| s.is_error()).map(|s| s.index),
                    code = %err.code(),
                    error = %err,
                    "Workflow failed"
                );
            }
            Err(err) => {
                tracing::error!(workflow_id = %id, error = %err, "Workflow aborted");
                let event = workflow.record(Step::aborted(err.to_string()));
                self.bus.publish(ProgressEvent::Step(event));
            }
        }

        workflow
    }

    async fn drive(&self, workflow: &mut ActionWorkflow) -> Result<(), WorkflowError> {
        workflow.begin(WorkflowPhase::ReadPosition)?;
        let result = self.read_position().await;
        let snapshot = self.resolve(workflow, WorkflowPhase::ReadPosition, result)?;

        workflow.begin(WorkflowPhase::Delegate)?;
        let result = self.delegate().await;
        self.resolve(workflow, WorkflowPhase::Delegate, result)?;

        workflow.begin(WorkflowPhase::ExecuteOnContext)?;
        let result = self.execute(workflow.category()).await;
        self.resolve(workflow, WorkflowPhase::ExecuteOnContext, result)?;

        workflow.begin(WorkflowPhase::CommitAndReturn)?;
        let result = self.commit_and_return().await;
        self.resolve(workflow, WorkflowPhase::CommitAndReturn, result)?;

        workflow.begin(WorkflowPhase::Checkpoint)?;
        let result = self.checkpoint(workflow.id(), &snapshot).await;
        self.resolve(workflow, WorkflowPhase::Checkpoint, result)?;

        Ok(())
    }

    /// Records and publishes the step for `phase`, passing the value through.
    fn resolve<T>(
        &self,
        workflow: &mut ActionWorkflow,
        phase: WorkflowPhase,
        result: Result<(T, Step), WorkflowError>,
    ) -> Result<T, WorkflowError> {
        let (outcome, step) = match result {
            Ok((value, step)) => (Ok(value), step),
            Err(err) => {
                let step = Step::error(phase, err.to_string());
                (Err(err), step)
            }
        };

        tracing::debug!(
            workflow_id = %workflow.id(),
            step = step.index,
            status = ?step.status,
            "Phase resolved"
        );
        let event = workflow.record(step);
        self.bus.publish(ProgressEvent::Step(event));
        outcome
    }

    async fn read_position(&self) -> Result<(PositionSnapshot, Step), WorkflowError> {
        let snapshot = self.oracle.snapshot().await?;
        let step = Step::success(WorkflowPhase::ReadPosition).with_detail(snapshot.describe());
        Ok((snapshot, step))
    }

    async fn delegate(&self) -> Result<((), Step), WorkflowError> {
        let location = self.inspector.inspect(&self.binding.session).await?;
        if location.is_ephemeral() {
            tracing::info!(session = %self.binding.session, "Already delegated, skipping delegate");
            let step = Step::success(WorkflowPhase::Delegate).with_detail(ALREADY_DELEGATED_DETAIL);
            return Ok(((), step));
        }

        let receipt = self
            .verifier
            .submit(
                self.ledger.as_ref(),
                &self.binding.session,
                SessionOperation::Delegate {
                    owner: self.binding.owner.clone(),
                },
                &self.binding.device_key,
            )
            .await?;

        tokio::time::sleep(self.config.settle_delay).await;

        let step =
            Step::success(WorkflowPhase::Delegate).with_reference(receipt.signature.as_str());
        Ok(((), step))
    }

    async fn execute(&self, category: ActionCategory) -> Result<((), Step), WorkflowError> {
        let amount = self.config.action_amount;
        let receipt = self
            .verifier
            .submit(
                self.rollup.as_ref(),
                &self.binding.session,
                SessionOperation::ExecuteAction { category, amount },
                &self.binding.device_key,
            )
            .await?;

        let step = Step::success(WorkflowPhase::ExecuteOnContext)
            .with_reference(receipt.signature.as_str())
            .with_detail(format!("{} for {}", category, amount));
        Ok(((), step))
    }

    async fn commit_and_return(&self) -> Result<((), Step), WorkflowError> {
        let commit = self
            .verifier
            .submit(
                self.rollup.as_ref(),
                &self.binding.session,
                SessionOperation::Commit,
                &self.binding.device_key,
            )
            .await?;
        let undelegate = self
            .verifier
            .submit(
                self.rollup.as_ref(),
                &self.binding.session,
                SessionOperation::Undelegate,
                &self.binding.device_key,
            )
            .await?;

        let step = Step::success(WorkflowPhase::CommitAndReturn)
            .with_reference(undelegate.signature.as_str())
            .with_detail(format!("Committed in {}", commit.signature));
        Ok(((), step))
    }

    async fn checkpoint(
        &self,
        workflow_id: WorkflowId,
        snapshot: &PositionSnapshot,
    ) -> Result<((), Step), WorkflowError> {
        match self.poller.wait_for_return(&self.binding.session).await {
            ReconciliationOutcome::Returned { attempts } => {
                tracing::debug!(workflow_id = %workflow_id, attempts, "Ownership returned");
                let receipt = self
                    .verifier
                    .submit(
                        self.ledger.as_ref(),
                        &self.binding.session,
                        SessionOperation::CheckpointStatus {
                            market_pointer: snapshot.market_pointer,
                            fees: snapshot.fees,
                        },
                        &self.binding.device_key,
                    )
                    .await?;
                let step = Step::success(WorkflowPhase::Checkpoint)
                    .with_reference(receipt.signature.as_str());
                Ok(((), step))
            }
            ReconciliationOutcome::Pending { attempts } => {
                tracing::warn!(
                    workflow_id = %workflow_id,
                    attempts,
                    "Ownership not yet returned, deferring checkpoint to monitor"
                );
                self.deferred
                    .defer(workflow_id, self.binding.session.clone())
                    .await;
                let step =
                    Step::success(WorkflowPhase::Checkpoint).with_detail(CHECKPOINT_DEFERRED_DETAIL);
                Ok(((), step))
            }
        }
    }
}
