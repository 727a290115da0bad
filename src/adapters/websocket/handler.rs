//! WebSocket upgrade handler for the push channel.
//!
//! Connection lifecycle:
//! 1. Upgrade to WebSocket and send `connected`
//! 2. Forward every progress event to the client once it is authenticated
//! 3. Handle pings, authentication and action triggers until disconnect

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tower_http::trace::TraceLayer;

use crate::application::{ActionTrigger, ProgressBus, TriggerOutcome};
use crate::domain::foundation::{ErrorCode, Timestamp};
use crate::domain::session::ActionCategory;

use super::connection::{ClientId, ConnectionSession, TriggerRefusal};
use super::messages::{ClientMessage, ConnectedMessage, ControlMessage, ServerMessage};

/// Direct replies queued per connection before the sender falls behind.
const REPLY_BUFFER: usize = 32;

/// State shared by every connection.
#[derive(Clone)]
pub struct PushState {
    pub trigger: ActionTrigger,
    pub bus: ProgressBus,
    pub auth_token: Option<Arc<SecretString>>,
    pub triggers_per_minute: u32,
}

impl PushState {
    pub fn new(
        trigger: ActionTrigger,
        bus: ProgressBus,
        auth_token: Option<SecretString>,
        triggers_per_minute: u32,
    ) -> Self {
        Self {
            trigger,
            bus,
            auth_token: auth_token.map(Arc::new),
            triggers_per_minute,
        }
    }

    fn open_session(&self) -> ConnectionSession {
        ConnectionSession::new(
            ClientId::new(),
            self.auth_token.is_some(),
            self.triggers_per_minute,
        )
    }
}

/// Route: `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<PushState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Route: `GET /health`
pub async fn health_handler(State(state): State<PushState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "workflowInFlight": state.trigger.is_busy(),
        "subscribers": state.bus.subscriber_count(),
    }))
}

async fn handle_socket(socket: WebSocket, state: PushState) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = state.open_session();
    let client_id = session.client_id().clone();

    // Subscribe before announcing so nothing published after `connected` is missed.
    let mut events = state.bus.subscribe();

    let connected = ServerMessage::Connected(ConnectedMessage {
        client_id: client_id.to_string(),
        authenticated: session.is_authenticated(),
        timestamp: Timestamp::now().to_rfc3339(),
    });
    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!(client_id = %client_id, "Failed to send connected message: {}", e);
        return;
    }
    tracing::info!(client_id = %client_id, "Push client connected");

    let (auth_tx, auth_rx) = watch::channel(session.is_authenticated());
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(REPLY_BUFFER);

    let mut send_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            loop {
                let outbound = tokio::select! {
                    reply = reply_rx.recv() => match reply {
                        Some(reply) => reply,
                        None => break,
                    },
                    event = events.recv() => match event {
                        Ok(event) if *auth_rx.borrow() => ServerMessage::from(event),
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(client_id = %client_id, missed, "Push client lagging");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                };
                if let Err(e) = send_message(&mut sender, &outbound).await {
                    tracing::debug!(client_id = %client_id, "Send error, closing connection: {}", e);
                    break;
                }
            }
        })
    };

    let mut recv_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        let was_authenticated = session.is_authenticated();
                        let reply = process_client_message(&state, &mut session, &text, Instant::now());
                        if !was_authenticated && session.is_authenticated() {
                            let _ = auth_tx.send(true);
                        }
                        if let Some(reply) = reply {
                            if reply_tx.send(reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::warn!(client_id = %client_id, "Received unsupported binary message");
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        tracing::debug!(client_id = %client_id, "Client sent close frame");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(client_id = %client_id, "Receive error: {}", e);
                        break;
                    }
                }
            }
        })
    };

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    tracing::info!(client_id = %client_id, "Push client disconnected");
}

/// Handles one text frame and returns the direct reply, if any.
///
/// Triggers that reach a busy gate are dropped without a reply.
pub fn process_client_message(
    state: &PushState,
    session: &mut ConnectionSession,
    text: &str,
    now: Instant,
) -> Option<ServerMessage> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(client_id = %session.client_id(), "Unparseable client message: {}", e);
            return Some(ServerMessage::error(
                ErrorCode::InvalidMessage,
                "Unrecognized message",
            ));
        }
    };

    match message {
        ClientMessage::Control(ControlMessage::Ping) => Some(ServerMessage::pong()),

        ClientMessage::Control(ControlMessage::Authenticate { token }) => {
            let accepted = match &state.auth_token {
                Some(expected) => session.authenticate(&token, expected),
                None => true,
            };
            if accepted {
                tracing::info!(client_id = %session.client_id(), "Push client authenticated");
                None
            } else {
                tracing::warn!(client_id = %session.client_id(), "Push client presented a bad token");
                Some(ServerMessage::error(
                    ErrorCode::AuthenticationRequired,
                    "Invalid token",
                ))
            }
        }

        ClientMessage::Trigger { action } => {
            let category = match action.parse::<ActionCategory>() {
                Ok(category) => category,
                Err(e) => return Some(ServerMessage::error(ErrorCode::InvalidMessage, e.to_string())),
            };

            match session.admit_trigger(now) {
                Err(TriggerRefusal::NotAuthenticated) => {
                    return Some(ServerMessage::error(
                        ErrorCode::AuthenticationRequired,
                        "Authenticate before triggering actions",
                    ))
                }
                Err(TriggerRefusal::RateLimited) => {
                    return Some(ServerMessage::error(
                        ErrorCode::RateLimited,
                        "Too many triggers, try again later",
                    ))
                }
                Ok(()) => {}
            }

            match state.trigger.trigger(category) {
                TriggerOutcome::Started { workflow_id, .. } => {
                    tracing::info!(
                        client_id = %session.client_id(),
                        workflow_id = %workflow_id,
                        category = %category,
                        "Workflow triggered"
                    );
                }
                TriggerOutcome::Rejected => {
                    session.refund_trigger();
                    tracing::debug!(client_id = %session.client_id(), "Trigger dropped, workflow in flight");
                }
            }
            None
        }
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            Ok(())
        }
    }
}

/// Router exposing `/ws` and `/health`.
pub fn push_router(state: PushState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::InMemoryPositionOracle;
    use crate::adapters::venue::{SimulatedNetwork, SimulationConfig};
    use crate::application::{
        ConcurrencyGate, DeferredCheckpoints, DelegationOrchestrator, OrchestratorConfig,
        ProgressEvent, SessionBinding,
    };
    use crate::domain::foundation::Address;
    use crate::domain::position::{FeeAmounts, PositionSnapshot};
    use crate::domain::session::StrategyMask;
    use crate::ports::{SessionOperation, SessionVenue};
    use std::time::Duration;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    async fn state(token: Option<&str>, per_minute: u32) -> PushState {
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
        network
            .ledger()
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
        network
            .ledger()
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
            Arc::new(InMemoryPositionOracle::new(
                PositionSnapshot::new(0, 10, 5, FeeAmounts::default(), Timestamp::now()).unwrap(),
            )),
            Arc::new(network.ledger()),
            Arc::new(network.rollup()),
            bus.clone(),
            binding,
            DeferredCheckpoints::new(),
            OrchestratorConfig::default(),
        );
        let trigger = ActionTrigger::new(ConcurrencyGate::new(), Arc::new(orchestrator), bus.clone());
        PushState::new(
            trigger,
            bus,
            token.map(|t| SecretString::new(t.to_string())),
            per_minute,
        )
    }

    fn error_code(reply: Option<ServerMessage>) -> String {
        match reply {
            Some(ServerMessage::Error(err)) => err.code,
            other => panic!("expected error reply, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ping_gets_pong() {
        let state = state(None, 5).await;
        let mut session = state.open_session();
        let reply = process_client_message(&state, &mut session, r#"{"type":"ping"}"#, Instant::now());
        assert!(matches!(reply, Some(ServerMessage::Pong(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_gets_invalid_message() {
        let state = state(None, 5).await;
        let mut session = state.open_session();
        let reply = process_client_message(&state, &mut session, "not json", Instant::now());
        assert_eq!(error_code(reply), "INVALID_MESSAGE");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_action_is_rejected() {
        let state = state(None, 5).await;
        let mut session = state.open_session();
        let reply =
            process_client_message(&state, &mut session, r#"{"action":"moon"}"#, Instant::now());
        assert_eq!(error_code(reply), "INVALID_MESSAGE");
        assert!(!state.trigger.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_requires_authentication_when_token_configured() {
        let state = state(Some("hunter2"), 5).await;
        let mut session = state.open_session();
        let trigger = r#"{"action":"lp_rebalance"}"#;

        let reply = process_client_message(&state, &mut session, trigger, Instant::now());
        assert_eq!(error_code(reply), "AUTHENTICATION_REQUIRED");

        let reply = process_client_message(
            &state,
            &mut session,
            r#"{"type":"authenticate","token":"wrong"}"#,
            Instant::now(),
        );
        assert_eq!(error_code(reply), "AUTHENTICATION_REQUIRED");

        let reply = process_client_message(
            &state,
            &mut session,
            r#"{"type":"authenticate","token":"hunter2"}"#,
            Instant::now(),
        );
        assert!(reply.is_none());
        assert!(process_client_message(&state, &mut session, trigger, Instant::now()).is_none());
        assert!(state.trigger.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_while_busy_is_dropped_silently() {
        let state = state(None, 5).await;
        let mut events = state.bus.subscribe();
        let mut session = state.open_session();
        let trigger = r#"{"action":"lp_rebalance"}"#;

        assert!(process_client_message(&state, &mut session, trigger, Instant::now()).is_none());
        assert!(process_client_message(&state, &mut session, trigger, Instant::now()).is_none());

        // Let the single workflow finish and count its steps.
        tokio::time::sleep(Duration::from_secs(120)).await;
        let mut steps = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, ProgressEvent::Step(_)) {
                steps += 1;
            }
        }
        assert_eq!(steps, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_rate_is_limited_per_connection() {
        let state = state(None, 1).await;
        let mut session = state.open_session();
        let trigger = r#"{"action":"lp_rebalance"}"#;

        assert!(process_client_message(&state, &mut session, trigger, Instant::now()).is_none());
        let reply = process_client_message(&state, &mut session, trigger, Instant::now());
        assert_eq!(error_code(reply), "RATE_LIMITED");
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_dropped_at_busy_gate_keeps_rate_budget() {
        let state = state(None, 2).await;
        let mut session = state.open_session();
        let trigger = r#"{"action":"lp_rebalance"}"#;

        assert!(process_client_message(&state, &mut session, trigger, Instant::now()).is_none());
        assert!(state.trigger.is_busy());
        assert!(process_client_message(&state, &mut session, trigger, Instant::now()).is_none());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!state.trigger.is_busy());

        let reply = process_client_message(&state, &mut session, trigger, Instant::now());
        assert!(reply.is_none());
        assert!(state.trigger.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn router_builds() {
        let _router = push_router(state(None, 5).await);
    }
}
