//! Per-connection session state.
//!
//! Owned by the socket's receive loop and passed into message handling, so
//! nothing about a connection lives in globals.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tokio::time::Instant;
use uuid::Uuid;

/// Unique identifier for a WebSocket client connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a trigger from this connection was refused before reaching the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRefusal {
    NotAuthenticated,
    RateLimited,
}

/// Fixed one-minute window of accepted triggers.
#[derive(Debug, Clone)]
struct TriggerWindow {
    limit: u32,
    started: Instant,
    count: u32,
}

const WINDOW: Duration = Duration::from_secs(60);

impl TriggerWindow {
    fn admit(&mut self, now: Instant) -> bool {
        if now.duration_since(self.started) >= WINDOW {
            self.started = now;
            self.count = 0;
        }
        if self.count >= self.limit {
            return false;
        }
        self.count += 1;
        true
    }

    fn refund(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

#[derive(Debug)]
pub struct ConnectionSession {
    client_id: ClientId,
    authenticated: bool,
    triggers: TriggerWindow,
}

impl ConnectionSession {
    /// A connection starts authenticated only when no token is configured.
    pub fn new(client_id: ClientId, token_required: bool, triggers_per_minute: u32) -> Self {
        Self {
            client_id,
            authenticated: !token_required,
            triggers: TriggerWindow {
                limit: triggers_per_minute,
                started: Instant::now(),
                count: 0,
            },
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Compares `presented` with `expected` in constant time.
    pub fn authenticate(&mut self, presented: &str, expected: &SecretString) -> bool {
        let matches: bool = presented
            .as_bytes()
            .ct_eq(expected.expose_secret().as_bytes())
            .into();
        if matches {
            self.authenticated = true;
        }
        matches
    }

    /// Counts a trigger against this connection's window.
    pub fn admit_trigger(&mut self, now: Instant) -> Result<(), TriggerRefusal> {
        if !self.authenticated {
            return Err(TriggerRefusal::NotAuthenticated);
        }
        if !self.triggers.admit(now) {
            return Err(TriggerRefusal::RateLimited);
        }
        Ok(())
    }

    /// Returns the slot taken by a trigger that never started a workflow.
    pub fn refund_trigger(&mut self) {
        self.triggers.refund();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_connection_starts_authenticated() {
        let session = ConnectionSession::new(ClientId::new(), false, 5);
        assert!(session.is_authenticated());
    }

    #[test]
    fn token_must_match_exactly() {
        let expected = SecretString::new("correct-horse".to_string());
        let mut session = ConnectionSession::new(ClientId::new(), true, 5);

        assert!(!session.authenticate("correct-hors", &expected));
        assert!(!session.is_authenticated());
        assert!(session.authenticate("correct-horse", &expected));
        assert!(session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn unauthenticated_trigger_is_refused() {
        let mut session = ConnectionSession::new(ClientId::new(), true, 5);
        assert_eq!(
            session.admit_trigger(Instant::now()),
            Err(TriggerRefusal::NotAuthenticated)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn window_limits_then_resets() {
        let mut session = ConnectionSession::new(ClientId::new(), false, 2);
        let start = Instant::now();

        assert!(session.admit_trigger(start).is_ok());
        assert!(session.admit_trigger(start).is_ok());
        assert_eq!(
            session.admit_trigger(start + Duration::from_secs(59)),
            Err(TriggerRefusal::RateLimited)
        );
        assert!(session.admit_trigger(start + Duration::from_secs(60)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn refunded_trigger_frees_its_slot() {
        let mut session = ConnectionSession::new(ClientId::new(), false, 1);
        let start = Instant::now();

        assert!(session.admit_trigger(start).is_ok());
        session.refund_trigger();
        assert!(session.admit_trigger(start).is_ok());
        assert_eq!(
            session.admit_trigger(start),
            Err(TriggerRefusal::RateLimited)
        );
    }
}
