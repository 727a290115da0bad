//! ConcurrencyGate - at most one action workflow per process.
//!
//! Backed by a single-permit semaphore. Acquisition never waits: a trigger
//! that arrives while a workflow is in flight is refused, not queued.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permit: Arc<Semaphore>,
}

/// Held for the lifetime of one workflow. Dropping it opens the gate.
#[derive(Debug)]
pub struct GateGuard {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    pub fn new() -> Self {
        Self {
            permit: Arc::new(Semaphore::new(1)),
        }
    }

    /// Returns a guard if no workflow is running, `None` otherwise.
    pub fn try_acquire(&self) -> Option<GateGuard> {
        Arc::clone(&self.permit)
            .try_acquire_owned()
            .ok()
            .map(|permit| GateGuard { _permit: permit })
    }

    pub fn is_held(&self) -> bool {
        self.permit.available_permits() == 0
    }

    /// Resolves once no workflow holds the gate.
    pub async fn wait_idle(&self) {
        // Never closed, so this only errs if that changes.
        let _ = self.permit.acquire().await;
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl GateGuard {
    /// Releases the gate early. Equivalent to dropping the guard.
    pub fn release(self) {}
}
