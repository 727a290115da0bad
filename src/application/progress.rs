//! ProgressBus - broadcast of workflow steps and monitor ticks.
//!
//! Publishing never blocks. A subscriber that falls behind loses its oldest
//! events without affecting anyone else, and late subscribers see only what
//! is published after they subscribe.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::foundation::{Timestamp, WorkflowId};
use crate::domain::position::{FeeAmounts, PositionSnapshot};
use crate::domain::workflow::StepEvent;

/// Default number of events buffered per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Position fields reported by a tick when a snapshot was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickPosition {
    pub market_pointer: i32,
    pub range_low: i32,
    pub range_high: i32,
    pub in_range: bool,
    pub fees: FeeAmounts,
}

impl From<&PositionSnapshot> for TickPosition {
    fn from(snapshot: &PositionSnapshot) -> Self {
        Self {
            market_pointer: snapshot.market_pointer,
            range_low: snapshot.range_low,
            range_high: snapshot.range_high,
            in_range: snapshot.in_range(),
            fees: snapshot.fees,
        }
    }
}

/// One completed monitor tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickEvent {
    pub tick_number: u64,
    pub timestamp: Timestamp,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub position: Option<TickPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A deferred checkpoint that the monitor has since written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledEvent {
    pub workflow_id: WorkflowId,
    pub reference: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Step(StepEvent),
    Tick(TickEvent),
    Reconciled(ReconciledEvent),
}

/// Multi-subscriber fan-out for progress events.
#[derive(Debug, Clone)]
pub struct ProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes to every current subscriber, returning how many there were.
    pub fn publish(&self, event: ProgressEvent) -> usize {
        // No subscribers is not an error.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}
