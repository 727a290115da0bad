//! ActionTrigger - entry point for triggered actions.
//!
//! A trigger either wins the [`ConcurrencyGate`] and starts a workflow in the
//! background, or is refused without emitting anything. The gate guard lives
//! in the supervising task so it is released however the workflow ends.

use std::any::Any;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::foundation::WorkflowId;
use crate::domain::session::ActionCategory;
use crate::domain::workflow::{Step, StepEvent, WorkflowPhase};

use super::gate::ConcurrencyGate;
use super::orchestrator::DelegationOrchestrator;
use super::progress::{ProgressBus, ProgressEvent};

#[derive(Debug)]
pub enum TriggerOutcome {
    Started {
        workflow_id: WorkflowId,
        handle: JoinHandle<()>,
    },
    /// A workflow is already running. Nothing was started or published.
    Rejected,
}

impl TriggerOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, TriggerOutcome::Started { .. })
    }
}

#[derive(Clone)]
pub struct ActionTrigger {
    gate: ConcurrencyGate,
    orchestrator: Arc<DelegationOrchestrator>,
    bus: ProgressBus,
}

impl ActionTrigger {
    pub fn new(
        gate: ConcurrencyGate,
        orchestrator: Arc<DelegationOrchestrator>,
        bus: ProgressBus,
    ) -> Self {
        Self {
            gate,
            orchestrator,
            bus,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_held()
    }

    /// Starts a workflow for `category` unless one is already running.
    pub fn trigger(&self, category: ActionCategory) -> TriggerOutcome {
        let Some(guard) = self.gate.try_acquire() else {
            tracing::debug!(category = %category, "Workflow in flight, trigger dropped");
            return TriggerOutcome::Rejected;
        };

        let workflow_id = WorkflowId::new();
        let orchestrator = Arc::clone(&self.orchestrator);
        let bus = self.bus.clone();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let run = tokio::spawn(async move {
                orchestrator.run(workflow_id, category).await;
            });

            if let Err(err) = run.await {
                let detail = if err.is_panic() {
                    panic_message(err.into_panic())
                } else {
                    "workflow task cancelled".to_string()
                };
                tracing::error!(workflow_id = %workflow_id, detail = %detail, "Workflow aborted");
                let event = StepEvent::new(
                    workflow_id,
                    WorkflowPhase::WORKING.len(),
                    Step::aborted(detail),
                );
                bus.publish(ProgressEvent::Step(event));
            }
        });

        TriggerOutcome::Started {
            workflow_id,
            handle,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "workflow panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::InMemoryPositionOracle;
    use crate::adapters::venue::{SimulatedNetwork, SimulationConfig};
    use crate::application::{DeferredCheckpoints, OrchestratorConfig, SessionBinding};
    use crate::domain::foundation::{Address, Timestamp};
    use crate::domain::position::{FeeAmounts, PositionSnapshot};
    use crate::domain::session::StrategyMask;
    use crate::domain::workflow::{StepStatus, ABORTED_STEP_INDEX};
    use crate::ports::{OracleError, PositionOracle, SessionOperation, SessionVenue};
    use async_trait::async_trait;
    use std::time::Duration;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    struct PanickingOracle;

    #[async_trait]
    impl PositionOracle for PanickingOracle {
        async fn snapshot(&self) -> Result<PositionSnapshot, OracleError> {
            panic!("snapshot decoder hit an impossible layout")
        }
    }

    async fn trigger_with(oracle: Arc<dyn PositionOracle>) -> (ActionTrigger, ProgressBus) {
        let network = SimulatedNetwork::new(SimulationConfig {
            program_id: addr("AgentProgram"),
            delegation_program_id: addr("DelegationProgram"),
            propagation_delay: Some(Duration::from_secs(1)),
            skip_preflight: false,
        });
        let binding = SessionBinding::derive(
            &addr("AgentProgram"),
            addr("DelegationProgram"),
            addr("owner"),
            addr("device"),
        );
        let ledger = network.ledger();
        ledger
            .submit(
                &binding.session,
                SessionOperation::CreateSession {
                    device_key: binding.device_key.clone(),
                    ttl_secs: 3_600,
                    max_exposure: 1_000_000,
                    strategy_mask: StrategyMask::all(),
                },
                &binding.owner,
            )
            .await
            .unwrap();
        ledger
            .submit(
                &binding.session,
                SessionOperation::RegisterMonitor {
                    range_low: 0,
                    range_high: 10,
                },
                &binding.owner,
            )
            .await
            .unwrap();

        let bus = ProgressBus::default();
        let orchestrator = DelegationOrchestrator::new(
            oracle,
            Arc::new(network.ledger()),
            Arc::new(network.rollup()),
            bus.clone(),
            binding,
            DeferredCheckpoints::new(),
            OrchestratorConfig::default(),
        );
        let trigger = ActionTrigger::new(ConcurrencyGate::new(), Arc::new(orchestrator), bus.clone());
        (trigger, bus)
    }

    fn healthy_oracle() -> Arc<dyn PositionOracle> {
        Arc::new(InMemoryPositionOracle::new(
            PositionSnapshot::new(0, 10, 5, FeeAmounts::default(), Timestamp::now()).unwrap(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn second_trigger_while_running_is_rejected_silently() {
        let (trigger, bus) = trigger_with(healthy_oracle()).await;
        let mut events = bus.subscribe();

        let first = trigger.trigger(ActionCategory::LpRebalance);
        let second = trigger.trigger(ActionCategory::LpRebalance);
        assert!(first.is_started());
        assert!(matches!(second, TriggerOutcome::Rejected));

        if let TriggerOutcome::Started { handle, .. } = first {
            handle.await.unwrap();
        }

        let mut ids = Vec::new();
        while let Ok(ProgressEvent::Step(step)) = events.try_recv() {
            ids.push(step.workflow_id);
        }
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert!(!trigger.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn gate_reopens_after_workflow_finishes() {
        let (trigger, _bus) = trigger_with(healthy_oracle()).await;

        if let TriggerOutcome::Started { handle, .. } = trigger.trigger(ActionCategory::LpRebalance) {
            handle.await.unwrap();
        }
        assert!(trigger.trigger(ActionCategory::LpRebalance).is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn panic_becomes_aborted_step_and_releases_gate() {
        let (trigger, bus) = trigger_with(Arc::new(PanickingOracle)).await;
        let mut events = bus.subscribe();

        let outcome = trigger.trigger(ActionCategory::YieldSwitch);
        let workflow_id = match outcome {
            TriggerOutcome::Started {
                workflow_id,
                handle,
            } => {
                handle.await.unwrap();
                workflow_id
            }
            TriggerOutcome::Rejected => panic!("gate should be free"),
        };

        match events.try_recv().unwrap() {
            ProgressEvent::Step(step) => {
                assert_eq!(step.workflow_id, workflow_id);
                assert_eq!(step.step_index, ABORTED_STEP_INDEX);
                assert_eq!(step.status, StepStatus::Error);
                assert_eq!(
                    step.detail.as_deref(),
                    Some("snapshot decoder hit an impossible layout")
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!trigger.is_busy());
    }
}
