//! PeriodicMonitor - background checkpointing of position status.
//!
//! Every tick reads a snapshot and, if the session is on the durable ledger,
//! writes it as a checkpoint. While the session is delegated the write is
//! skipped; the ledger would reject it anyway. A summary line goes to the
//! activity log on every tick regardless of outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::foundation::Timestamp;
use crate::domain::position::PositionSnapshot;
use crate::domain::session::DelegationLocation;
use crate::ports::{ActivityLog, PositionOracle, SessionOperation, SessionVenue};

use super::binding::SessionBinding;
use super::progress::{ProgressBus, ProgressEvent, ReconciledEvent, TickEvent, TickPosition};
use super::reconciliation::{DeferredCheckpoints, LocationInspector};
use super::verification::SubmissionVerifier;

/// Log prefix the session program uses for out-of-range alerts.
const ALERT_PREFIX: &str = "ALERT";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

pub struct PeriodicMonitor {
    oracle: Arc<dyn PositionOracle>,
    ledger: Arc<dyn SessionVenue>,
    activity_log: Arc<dyn ActivityLog>,
    bus: ProgressBus,
    binding: SessionBinding,
    inspector: LocationInspector,
    verifier: SubmissionVerifier,
    deferred: DeferredCheckpoints,
    config: MonitorConfig,
    ticks: AtomicU64,
}

impl PeriodicMonitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        oracle: Arc<dyn PositionOracle>,
        ledger: Arc<dyn SessionVenue>,
        activity_log: Arc<dyn ActivityLog>,
        bus: ProgressBus,
        binding: SessionBinding,
        deferred: DeferredCheckpoints,
        verifier: SubmissionVerifier,
        config: MonitorConfig,
    ) -> Self {
        let inspector = LocationInspector::new(ledger.clone(), binding.delegation_program.clone());
        Self {
            oracle,
            ledger,
            activity_log,
            bus,
            binding,
            inspector,
            verifier,
            deferred,
            config,
            ticks: AtomicU64::new(0),
        }
    }

    /// Runs ticks at the configured interval until shutdown is signalled.
    ///
    /// The first tick fires immediately. A tick in progress is allowed to
    /// finish before the loop exits.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.config.interval.as_secs(), "Monitor started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Monitor stopping");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Performs one tick and publishes its event.
    pub async fn tick(&self) -> TickEvent {
        let tick_number = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        let timestamp = Timestamp::now();
        let mut tick = TickEvent {
            tick_number,
            timestamp,
            position: None,
            reference: None,
            error: None,
        };
        let mut summary = format!("[{}] tick #{}: ", timestamp.to_rfc3339(), tick_number);

        match self.oracle.snapshot().await {
            Err(err) => {
                tracing::warn!(tick = tick_number, error = %err, "Snapshot unavailable");
                summary.push_str(&format!("snapshot unavailable ({})", err));
                tick.error = Some(err.to_string());
            }
            Ok(snapshot) => {
                summary.push_str(&snapshot.describe());
                tick.position = Some(TickPosition::from(&snapshot));

                match self.inspector.inspect(&self.binding.session).await {
                    Err(err) => {
                        tracing::warn!(tick = tick_number, error = %err, "Location unavailable");
                        summary.push_str(&format!("; location unavailable ({})", err));
                        tick.error = Some(err.to_string());
                    }
                    Ok(DelegationLocation::Ephemeral) => {
                        tracing::info!(
                            tick = tick_number,
                            session = %self.binding.session,
                            "Session delegated, deferring checkpoint"
                        );
                        summary.push_str("; checkpoint deferred while delegated");
                    }
                    Ok(DelegationLocation::Durable) => {
                        self.checkpoint(&snapshot, &mut tick, &mut summary).await;
                    }
                }
            }
        }

        let pending = self.deferred.pending_count().await;
        if pending > 0 {
            summary.push_str(&format!("; reconciliation pending for {} workflow(s)", pending));
        }

        if let Err(err) = self.activity_log.append(&summary).await {
            tracing::warn!(tick = tick_number, error = %err, "Activity log append failed");
        }

        self.bus.publish(ProgressEvent::Tick(tick.clone()));
        tick
    }

    async fn checkpoint(
        &self,
        snapshot: &PositionSnapshot,
        tick: &mut TickEvent,
        summary: &mut String,
    ) {
        let result = self
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
            .await;

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(tick = tick.tick_number, error = %err, "Checkpoint failed");
                summary.push_str(&format!("; checkpoint failed ({})", err));
                tick.error = Some(err.to_string());
                return;
            }
        };

        let reference = receipt.signature.to_string();
        tracing::debug!(tick = tick.tick_number, signature = %reference, "Checkpoint written");
        summary.push_str(&format!("; checkpoint {}", reference));
        if let Some(alert) = receipt.logs.iter().find(|l| l.starts_with(ALERT_PREFIX)) {
            tracing::warn!(tick = tick.tick_number, alert = %alert, "Position left its range");
            summary.push_str(&format!("\n{}", alert));
        }

        for deferred in self.deferred.take_for(&self.binding.session).await {
            tracing::info!(
                workflow_id = %deferred.workflow_id,
                signature = %reference,
                "Deferred checkpoint reconciled"
            );
            summary.push_str(&format!("; reconciled workflow {}", deferred.workflow_id));
            self.bus.publish(ProgressEvent::Reconciled(ReconciledEvent {
                workflow_id: deferred.workflow_id,
                reference: reference.clone(),
                timestamp: Timestamp::now(),
            }));
        }

        tick.reference = Some(reference);
    }
}
