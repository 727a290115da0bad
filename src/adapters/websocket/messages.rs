//! WebSocket message types for the push channel.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, workflow steps, monitor ticks,
//!   reconciliations, errors, pongs
//! - Client → Server: action triggers, pings, authentication

use serde::{Deserialize, Serialize};

use crate::application::{ProgressEvent, ReconciledEvent, TickEvent};
use crate::domain::foundation::{ErrorCode, Timestamp};
use crate::domain::workflow::StepEvent;

// ============================================
// Server → Client Messages
// ============================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected(ConnectedMessage),
    Step(StepEvent),
    Tick(TickEvent),
    Reconciled(ReconciledEvent),
    Error(ErrorMessage),
    Pong(PongMessage),
}

/// Sent once when the socket is established.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub client_id: String,
    pub authenticated: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorMessage {
            code: code.to_string(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }
}

impl From<ProgressEvent> for ServerMessage {
    fn from(event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::Step(step) => ServerMessage::Step(step),
            ProgressEvent::Tick(tick) => ServerMessage::Tick(tick),
            ProgressEvent::Reconciled(reconciled) => ServerMessage::Reconciled(reconciled),
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// Inbound messages. Triggers carry no `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClientMessage {
    /// `{ "action": "lp_rebalance" }`
    Trigger { action: String },
    Control(ControlMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Ping,
    Authenticate { token: String },
}
