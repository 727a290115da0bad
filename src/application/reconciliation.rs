//! Tracking where authority over the session lives.
//!
//! - [`LocationInspector`] reads the session's owner program on the ledger.
//! - [`ReconciliationPoller`] waits for ownership to come back after an
//!   undelegate.
//! - [`DeferredCheckpoints`] remembers workflows whose checkpoint was handed
//!   to the periodic monitor.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{Address, Timestamp, WorkflowId};
use crate::domain::session::DelegationLocation;
use crate::ports::{SessionVenue, VenueError};

use super::retry::{BoundedRetry, Probe, RetryOutcome};

/// Reads [`DelegationLocation`] from the durable ledger.
#[derive(Clone)]
pub struct LocationInspector {
    ledger: Arc<dyn SessionVenue>,
    delegation_program: Address,
}

impl LocationInspector {
    pub fn new(ledger: Arc<dyn SessionVenue>, delegation_program: Address) -> Self {
        Self {
            ledger,
            delegation_program,
        }
    }

    pub async fn inspect(&self, session: &Address) -> Result<DelegationLocation, VenueError> {
        let owner = self
            .ledger
            .account_owner(session)
            .await?
            .ok_or_else(|| VenueError::AccountNotFound(session.clone()))?;
        Ok(DelegationLocation::from_owner(&owner, &self.delegation_program))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// Ownership is back on the durable ledger.
    Returned { attempts: u32 },
    /// Still delegated after every attempt. Not an error.
    Pending { attempts: u32 },
}

impl ReconciliationOutcome {
    pub fn is_returned(&self) -> bool {
        matches!(self, ReconciliationOutcome::Returned { .. })
    }
}

/// Polls ledger ownership at a fixed interval until the record returns.
#[derive(Clone)]
pub struct ReconciliationPoller {
    inspector: LocationInspector,
    retry: BoundedRetry,
}

impl ReconciliationPoller {
    pub fn new(inspector: LocationInspector, retry: BoundedRetry) -> Self {
        Self { inspector, retry }
    }

    /// Waits for `session` to be owned by anything other than the delegation
    /// program. Fetch failures count as "not yet".
    pub async fn wait_for_return(&self, session: &Address) -> ReconciliationOutcome {
        let inspector = &self.inspector;
        let outcome: RetryOutcome<(), ()> = self
            .retry
            .run(|attempt| async move {
                match inspector.inspect(session).await {
                    Ok(DelegationLocation::Durable) => Probe::Ready(()),
                    Ok(DelegationLocation::Ephemeral) => {
                        tracing::debug!(attempt, session = %session, "Still delegated");
                        Probe::NotYet
                    }
                    Err(err) => {
                        tracing::warn!(
                            attempt,
                            session = %session,
                            error = %err,
                            "Ownership fetch failed, will retry"
                        );
                        Probe::NotYet
                    }
                }
            })
            .await;

        match outcome {
            RetryOutcome::Succeeded { attempts, .. } => {
                ReconciliationOutcome::Returned { attempts }
            }
            RetryOutcome::Exhausted { attempts } | RetryOutcome::Aborted { attempts, .. } => {
                ReconciliationOutcome::Pending { attempts }
            }
        }
    }
}

/// A checkpoint the orchestrator could not write because ownership had not
/// yet returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredCheckpoint {
    pub workflow_id: WorkflowId,
    pub session: Address,
    pub deferred_at: Timestamp,
}

/// Shared list of deferred checkpoints.
///
/// The orchestrator adds to it; the monitor drains it after its next
/// successful durable checkpoint.
#[derive(Debug, Clone, Default)]
pub struct DeferredCheckpoints {
    inner: Arc<Mutex<Vec<DeferredCheckpoint>>>,
}

impl DeferredCheckpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn defer(&self, workflow_id: WorkflowId, session: Address) {
        self.inner.lock().await.push(DeferredCheckpoint {
            workflow_id,
            session,
            deferred_at: Timestamp::now(),
        });
    }

    pub async fn pending(&self) -> Vec<DeferredCheckpoint> {
        self.inner.lock().await.clone()
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Removes and returns every deferred checkpoint for `session`.
    pub async fn take_for(&self, session: &Address) -> Vec<DeferredCheckpoint> {
        let mut inner = self.inner.lock().await;
        let (taken, kept): (Vec<_>, Vec<_>) =
            inner.drain(..).partition(|d| &d.session == session);
        *inner = kept;
        taken
    }
}
