//! WebSocket push channel.
//!
//! Streams workflow progress and monitor ticks to connected clients and
//! accepts action triggers from them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  DelegationOrchestrator          PeriodicMonitor          │
//! └───────────────────────────────────────────────────────────┘
//!                  │ publishes steps / ticks / reconciliations
//!                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                      ProgressBus                          │
//! └───────────────────────────────────────────────────────────┘
//!                  │ one subscription per connection
//!                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  handle_socket (per client)                               │
//! │  ├── send task: bus events + direct replies → client      │
//! │  └── recv task: ConnectionSession, triggers → ActionTrigger│
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - Wire protocol types
//! - [`connection`] - Per-connection auth and trigger rate window
//! - [`handler`] - Axum upgrade handler and router

pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::{ClientId, ConnectionSession, TriggerRefusal};
pub use handler::{health_handler, process_client_message, push_router, ws_handler, PushState};
pub use messages::{
    ClientMessage, ConnectedMessage, ControlMessage, ErrorMessage, PongMessage, ServerMessage,
};
