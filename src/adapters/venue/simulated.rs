//! In-process simulation of the durable ledger and the ephemeral rollup.
//!
//! Both venues share one account store so ownership moves between them the
//! way it does on the real network:
//!
//! ```text
//!   ledger: session owned by program ──delegate──▶ owned by delegation program
//!   rollup:                                        live copy, executes actions
//!   rollup: undelegate ──(propagation delay)──▶ ledger: owned by program again
//! ```
//!
//! The program rules themselves live in the domain (`Session`,
//! `PositionMonitorRecord`); this adapter only decides which copy an
//! operation touches and what the receipt says.
//!
//! Fault injection (`fail_next`, `silently_fail_next`, `set_transport_down`,
//! `set_propagation_delay`) lets tests drive every failure path the
//! orchestrator must survive.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::foundation::{Address, Timestamp, TxSignature};
use crate::domain::session::{AuthorizationError, PositionMonitorRecord, Session};
use crate::ports::{Receipt, SessionOperation, SessionVenue, VenueError, VenueKind};

/// Static parameters of a simulated network.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Program that owns session and monitor records on the ledger.
    pub program_id: Address,
    /// Program that holds ownership while a record is delegated.
    pub delegation_program_id: Address,
    /// Time between an undelegate on the rollup and ownership returning on
    /// the ledger. `None` means ownership never returns.
    pub propagation_delay: Option<Duration>,
    /// When set, rejected operations still land and fail inside the receipt.
    pub skip_preflight: bool,
}

/// One submission as seen by the network, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub venue: VenueKind,
    pub operation: &'static str,
    pub signer: Address,
    pub signature: Option<TxSignature>,
}

#[derive(Debug, Clone)]
enum Fault {
    Reject(VenueError),
    Silent(String),
}

#[derive(Debug, Default)]
struct NetworkState {
    ledger_sessions: HashMap<Address, Session>,
    rollup_sessions: HashMap<Address, Session>,
    ledger_owners: HashMap<Address, Address>,
    monitors: HashMap<Address, PositionMonitorRecord>,
    pending_returns: HashMap<Address, Instant>,
    receipts: HashMap<TxSignature, Receipt>,
    submissions: Vec<SubmissionRecord>,
    faults: HashMap<(VenueKind, &'static str), VecDeque<Fault>>,
    transport_down: HashMap<VenueKind, bool>,
    propagation_override: Option<Option<Duration>>,
    slot: u64,
}

/// Shared state behind both simulated venues.
#[derive(Clone)]
pub struct SimulatedNetwork {
    config: SimulationConfig,
    state: Arc<Mutex<NetworkState>>,
}

impl SimulatedNetwork {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(NetworkState::default())),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The durable ledger view.
    pub fn ledger(&self) -> SimulatedVenue {
        SimulatedVenue {
            kind: VenueKind::Ledger,
            network: self.clone(),
        }
    }

    /// The ephemeral rollup view.
    pub fn rollup(&self) -> SimulatedVenue {
        SimulatedVenue {
            kind: VenueKind::Rollup,
            network: self.clone(),
        }
    }

    // === Fault injection and inspection ===

    /// The next `operation` on `venue` is refused at submission.
    pub async fn fail_next(&self, venue: VenueKind, operation: &'static str, error: VenueError) {
        self.state
            .lock()
            .await
            .faults
            .entry((venue, operation))
            .or_default()
            .push_back(Fault::Reject(error));
    }

    /// The next `operation` on `venue` lands but its instruction fails.
    pub async fn silently_fail_next(
        &self,
        venue: VenueKind,
        operation: &'static str,
        message: impl Into<String>,
    ) {
        self.state
            .lock()
            .await
            .faults
            .entry((venue, operation))
            .or_default()
            .push_back(Fault::Silent(message.into()));
    }

    pub async fn set_transport_down(&self, venue: VenueKind, down: bool) {
        self.state.lock().await.transport_down.insert(venue, down);
    }

    /// Overrides the configured propagation delay for later undelegations.
    pub async fn set_propagation_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.propagation_override = Some(delay);
    }

    pub async fn submissions(&self) -> Vec<SubmissionRecord> {
        self.state.lock().await.submissions.clone()
    }

    /// Submissions of one operation on one venue.
    pub async fn count_submissions(&self, venue: VenueKind, operation: &str) -> usize {
        self.state
            .lock()
            .await
            .submissions
            .iter()
            .filter(|s| s.venue == venue && s.operation == operation)
            .count()
    }

    pub async fn monitor_record(&self, session: &Address) -> Option<PositionMonitorRecord> {
        let monitor = PositionMonitorRecord::address_for(&self.config.program_id, session);
        self.state.lock().await.monitors.get(&monitor).cloned()
    }

    fn is_delegated(&self, state: &NetworkState, account: &Address) -> bool {
        state.ledger_owners.get(account) == Some(&self.config.delegation_program_id)
    }

    /// Completes undelegations whose propagation delay has elapsed.
    fn settle(&self, state: &mut NetworkState) {
        let now = Instant::now();
        let ready: Vec<Address> = state
            .pending_returns
            .iter()
            .filter(|(_, ready_at)| **ready_at <= now)
            .map(|(account, _)| account.clone())
            .collect();
        for account in ready {
            state.pending_returns.remove(&account);
            state
                .ledger_owners
                .insert(account.clone(), self.config.program_id.clone());
            tracing::debug!(account = %account, "Simulated ownership returned to ledger");
        }
    }

    fn apply(
        &self,
        state: &mut NetworkState,
        venue: VenueKind,
        session: &Address,
        operation: SessionOperation,
        signer: &Address,
    ) -> Result<Vec<String>, VenueError> {
        let now = Timestamp::now();
        match (venue, operation) {
            (
                VenueKind::Ledger,
                SessionOperation::CreateSession {
                    device_key,
                    ttl_secs,
                    max_exposure,
                    strategy_mask,
                },
            ) => {
                let expected = Session::address_for(&self.config.program_id, signer);
                if &expected != session {
                    return Err(VenueError::AccountNotFound(session.clone()));
                }
                if state.ledger_sessions.contains_key(session) {
                    return Err(VenueError::AlreadyExists(session.clone()));
                }
                let record = Session::create(
                    signer.clone(),
                    device_key,
                    ttl_secs,
                    max_exposure,
                    strategy_mask,
                    now,
                )?;
                let log = format!(
                    "Session initialized: owner={}, device_key={}, expires_at={}, max_exposure={}",
                    record.owner,
                    record.device_key,
                    record.expires_at.as_unix_secs(),
                    record.max_exposure
                );
                state.ledger_sessions.insert(session.clone(), record);
                state
                    .ledger_owners
                    .insert(session.clone(), self.config.program_id.clone());
                Ok(vec![log])
            }

            (
                VenueKind::Ledger,
                SessionOperation::RegisterMonitor {
                    range_low,
                    range_high,
                },
            ) => {
                if self.is_delegated(state, session) {
                    return Err(VenueError::AccountDelegated(session.clone()));
                }
                let record = state
                    .ledger_sessions
                    .get(session)
                    .ok_or_else(|| VenueError::AccountNotFound(session.clone()))?;
                if signer != &record.owner {
                    return Err(AuthorizationError::UnauthorizedKey.into());
                }
                if !record.active {
                    return Err(AuthorizationError::Inactive.into());
                }
                let monitor = PositionMonitorRecord::register(session.clone(), range_low, range_high)?;
                let address = PositionMonitorRecord::address_for(&self.config.program_id, session);
                if state.monitors.contains_key(&address) {
                    return Err(VenueError::AlreadyExists(address));
                }
                state.monitors.insert(address.clone(), monitor);
                state
                    .ledger_owners
                    .insert(address, self.config.program_id.clone());
                Ok(vec![format!(
                    "Monitor registered: range=[{}, {}]",
                    range_low, range_high
                )])
            }

            (VenueKind::Ledger, SessionOperation::Delegate { owner }) => {
                let expected = Session::address_for(&self.config.program_id, &owner);
                if &expected != session {
                    return Err(VenueError::AccountNotFound(session.clone()));
                }
                if self.is_delegated(state, session) {
                    return Ok(vec!["Account already delegated".to_string()]);
                }
                let record = state
                    .ledger_sessions
                    .get(session)
                    .cloned()
                    .ok_or_else(|| VenueError::AccountNotFound(session.clone()))?;
                state.rollup_sessions.insert(session.clone(), record);
                state.ledger_owners.insert(
                    session.clone(),
                    self.config.delegation_program_id.clone(),
                );
                Ok(vec![format!("Delegated {} to rollup", session)])
            }

            (venue, SessionOperation::ExecuteAction { category, amount }) => {
                let record = match venue {
                    VenueKind::Rollup => state
                        .rollup_sessions
                        .get_mut(session)
                        .ok_or_else(|| VenueError::NotDelegated(session.clone()))?,
                    VenueKind::Ledger => {
                        if self.is_delegated(state, session) {
                            return Err(VenueError::AccountDelegated(session.clone()));
                        }
                        state
                            .ledger_sessions
                            .get_mut(session)
                            .ok_or_else(|| VenueError::AccountNotFound(session.clone()))?
                    }
                };
                record.execute_action(signer, category, amount, now)?;
                Ok(vec![format!(
                    "Action executed: type={}, amount={}, total_spent={}/{}, remaining={}",
                    category.index(),
                    amount,
                    record.spent_exposure,
                    record.max_exposure,
                    record.remaining_exposure()
                )])
            }

            (VenueKind::Rollup, SessionOperation::Commit) => {
                let record = state
                    .rollup_sessions
                    .get(session)
                    .cloned()
                    .ok_or_else(|| VenueError::NotDelegated(session.clone()))?;
                if signer != &record.device_key {
                    return Err(AuthorizationError::UnauthorizedKey.into());
                }
                state.ledger_sessions.insert(session.clone(), record);
                Ok(vec!["Session committed to ledger".to_string()])
            }

            (VenueKind::Rollup, SessionOperation::Undelegate) => {
                let record = state
                    .rollup_sessions
                    .get(session)
                    .cloned()
                    .ok_or_else(|| VenueError::NotDelegated(session.clone()))?;
                if signer != &record.device_key {
                    return Err(AuthorizationError::UnauthorizedKey.into());
                }
                state.rollup_sessions.remove(session);
                state.ledger_sessions.insert(session.clone(), record);
                let delay = state
                    .propagation_override
                    .unwrap_or(self.config.propagation_delay);
                if let Some(delay) = delay {
                    state
                        .pending_returns
                        .insert(session.clone(), Instant::now() + delay);
                }
                Ok(vec!["Session undelegation scheduled".to_string()])
            }

            (
                VenueKind::Ledger,
                SessionOperation::CheckpointStatus {
                    market_pointer,
                    fees,
                },
            ) => {
                if self.is_delegated(state, session) {
                    return Err(VenueError::AccountDelegated(session.clone()));
                }
                let record = state
                    .ledger_sessions
                    .get(session)
                    .ok_or_else(|| VenueError::AccountNotFound(session.clone()))?;
                record.ensure_device_signer(signer, now)?;
                let address = PositionMonitorRecord::address_for(&self.config.program_id, session);
                let monitor = state
                    .monitors
                    .get_mut(&address)
                    .ok_or(VenueError::AccountNotFound(address))?;
                let change = monitor.apply_checkpoint(market_pointer, fees, now);
                let mut logs = Vec::with_capacity(2);
                if change.left_range() {
                    logs.push(format!(
                        "ALERT: position out of range! pointer={}, range=[{}, {}]",
                        market_pointer, monitor.range_low, monitor.range_high
                    ));
                }
                logs.push(format!(
                    "Status: pointer={}, in_range={}, fees {}",
                    market_pointer, change.now_in_range, fees
                ));
                Ok(logs)
            }

            (VenueKind::Ledger, SessionOperation::Revoke) => {
                if self.is_delegated(state, session) {
                    return Err(VenueError::AccountDelegated(session.clone()));
                }
                let record = state
                    .ledger_sessions
                    .get_mut(session)
                    .ok_or_else(|| VenueError::AccountNotFound(session.clone()))?;
                record.revoke(signer)?;
                Ok(vec!["Session revoked".to_string()])
            }

            (_, operation) => Err(VenueError::Unsupported(operation.name())),
        }
    }
}

/// One side of a [`SimulatedNetwork`].
#[derive(Clone)]
pub struct SimulatedVenue {
    kind: VenueKind,
    network: SimulatedNetwork,
}

#[async_trait]
impl SessionVenue for SimulatedVenue {
    fn kind(&self) -> VenueKind {
        self.kind
    }

    async fn submit(
        &self,
        session: &Address,
        operation: SessionOperation,
        signer: &Address,
    ) -> Result<TxSignature, VenueError> {
        let network = &self.network;
        let mut state = network.state.lock().await;
        network.settle(&mut state);

        let name = operation.name();
        let mut record = SubmissionRecord {
            venue: self.kind,
            operation: name,
            signer: signer.clone(),
            signature: None,
        };

        if state.transport_down.get(&self.kind).copied().unwrap_or(false) {
            state.submissions.push(record);
            return Err(VenueError::transport(format!("{} endpoint unreachable", self.kind)));
        }

        let fault = state
            .faults
            .get_mut(&(self.kind, name))
            .and_then(|queue| queue.pop_front());

        let outcome = match fault {
            Some(Fault::Reject(err)) => Err(err),
            Some(Fault::Silent(message)) => Ok(Err(message)),
            None => match network.apply(&mut state, self.kind, session, operation, signer) {
                Ok(logs) => Ok(Ok(logs)),
                Err(err @ VenueError::Transport(_)) => Err(err),
                Err(err) if network.config.skip_preflight => Ok(Err(err.to_string())),
                Err(err) => Err(err),
            },
        };

        let result = match outcome {
            Err(err) => Err(err),
            Ok(applied) => {
                state.slot += 1;
                let signature =
                    TxSignature::new(format!("{}-{:08}", self.kind, state.submissions.len() + 1));
                let (instruction_error, logs) = match applied {
                    Ok(logs) => (None, logs),
                    Err(message) => (Some(message), Vec::new()),
                };
                let receipt = Receipt {
                    signature: signature.clone(),
                    slot: state.slot,
                    instruction_error,
                    logs,
                };
                state.receipts.insert(signature.clone(), receipt);
                record.signature = Some(signature.clone());
                Ok(signature)
            }
        };

        state.submissions.push(record);
        result
    }

    async fn receipt(&self, signature: &TxSignature) -> Result<Option<Receipt>, VenueError> {
        let state = self.network.state.lock().await;
        if state.transport_down.get(&self.kind).copied().unwrap_or(false) {
            return Err(VenueError::transport(format!("{} endpoint unreachable", self.kind)));
        }
        Ok(state.receipts.get(signature).cloned())
    }

    async fn account_owner(&self, account: &Address) -> Result<Option<Address>, VenueError> {
        let mut state = self.network.state.lock().await;
        if state.transport_down.get(&self.kind).copied().unwrap_or(false) {
            return Err(VenueError::transport(format!("{} endpoint unreachable", self.kind)));
        }
        self.network.settle(&mut state);
        Ok(match self.kind {
            VenueKind::Ledger => state.ledger_owners.get(account).cloned(),
            VenueKind::Rollup => state
                .rollup_sessions
                .contains_key(account)
                .then(|| self.network.config.program_id.clone()),
        })
    }

    async fn fetch_session(&self, session: &Address) -> Result<Option<Session>, VenueError> {
        let mut state = self.network.state.lock().await;
        if state.transport_down.get(&self.kind).copied().unwrap_or(false) {
            return Err(VenueError::transport(format!("{} endpoint unreachable", self.kind)));
        }
        self.network.settle(&mut state);
        Ok(match self.kind {
            VenueKind::Ledger => state.ledger_sessions.get(session).cloned(),
            VenueKind::Rollup => state.rollup_sessions.get(session).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::FeeAmounts;
    use crate::domain::session::{ActionCategory, StrategyMask};

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn config(skip_preflight: bool) -> SimulationConfig {
        SimulationConfig {
            program_id: addr("AgentProgram"),
            delegation_program_id: addr("DelegationProgram"),
            propagation_delay: Some(Duration::from_secs(2)),
            skip_preflight,
        }
    }

    async fn bootstrap(network: &SimulatedNetwork, max_exposure: u64) -> Address {
        let owner = addr("owner");
        let session = Session::address_for(&network.config().program_id, &owner);
        let ledger = network.ledger();
        ledger
            .submit(
                &session,
                SessionOperation::CreateSession {
                    device_key: addr("device"),
                    ttl_secs: 3_600,
                    max_exposure,
                    strategy_mask: StrategyMask::all(),
                },
                &owner,
            )
            .await
            .unwrap();
        ledger
            .submit(
                &session,
                SessionOperation::RegisterMonitor {
                    range_low: 0,
                    range_high: 10,
                },
                &owner,
            )
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn delegate_moves_ownership_to_delegation_program() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();

        ledger
            .submit(&session, SessionOperation::Delegate { owner: addr("owner") }, &addr("device"))
            .await
            .unwrap();

        assert_eq!(
            ledger.account_owner(&session).await.unwrap(),
            Some(addr("DelegationProgram"))
        );
        assert!(network.rollup().fetch_session(&session).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delegating_twice_is_not_an_error() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();
        let op = SessionOperation::Delegate { owner: addr("owner") };

        ledger.submit(&session, op.clone(), &addr("device")).await.unwrap();
        let sig = ledger.submit(&session, op, &addr("device")).await.unwrap();
        let receipt = ledger.receipt(&sig).await.unwrap().unwrap();
        assert!(receipt.succeeded());
    }

    #[tokio::test]
    async fn rollup_rejects_actions_on_undelegated_session() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let err = network
            .rollup()
            .submit(
                &session,
                SessionOperation::ExecuteAction {
                    category: ActionCategory::LpRebalance,
                    amount: 1,
                },
                &addr("device"),
            )
            .await
            .unwrap_err();
        assert_eq!(err, VenueError::NotDelegated(session));
    }

    #[tokio::test]
    async fn exposure_rejection_leaves_spent_unchanged() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000_000).await;
        network
            .ledger()
            .submit(&session, SessionOperation::Delegate { owner: addr("owner") }, &addr("device"))
            .await
            .unwrap();
        let rollup = network.rollup();

        let err = rollup
            .submit(
                &session,
                SessionOperation::ExecuteAction {
                    category: ActionCategory::LpRebalance,
                    amount: 1_100_001,
                },
                &addr("device"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VenueError::Rejected(AuthorizationError::ExposureLimitExceeded { .. })
        ));
        let record = rollup.fetch_session(&session).await.unwrap().unwrap();
        assert_eq!(record.spent_exposure, 0);
    }

    #[tokio::test]
    async fn skip_preflight_turns_rejections_into_failed_receipts() {
        let network = SimulatedNetwork::new(config(true));
        let session = bootstrap(&network, 10).await;
        network
            .ledger()
            .submit(&session, SessionOperation::Delegate { owner: addr("owner") }, &addr("device"))
            .await
            .unwrap();
        let rollup = network.rollup();

        let sig = rollup
            .submit(
                &session,
                SessionOperation::ExecuteAction {
                    category: ActionCategory::LpRebalance,
                    amount: 11,
                },
                &addr("device"),
            )
            .await
            .unwrap();

        let receipt = rollup.receipt(&sig).await.unwrap().unwrap();
        assert!(!receipt.succeeded());
        assert!(receipt
            .instruction_error
            .unwrap()
            .contains("exceeds exposure cap"));
    }

    #[tokio::test(start_paused = true)]
    async fn undelegate_returns_ownership_after_propagation_delay() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();
        let rollup = network.rollup();
        ledger
            .submit(&session, SessionOperation::Delegate { owner: addr("owner") }, &addr("device"))
            .await
            .unwrap();

        rollup
            .submit(&session, SessionOperation::Undelegate, &addr("device"))
            .await
            .unwrap();
        assert_eq!(
            ledger.account_owner(&session).await.unwrap(),
            Some(addr("DelegationProgram"))
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(
            ledger.account_owner(&session).await.unwrap(),
            Some(addr("AgentProgram"))
        );
    }

    async fn delegate_then_undelegate(network: &SimulatedNetwork, session: &Address) {
        network
            .ledger()
            .submit(session, SessionOperation::Delegate { owner: addr("owner") }, &addr("device"))
            .await
            .unwrap();
        network
            .rollup()
            .submit(session, SessionOperation::Undelegate, &addr("device"))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_propagation_leaves_ownership_with_delegation_program() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        network.set_propagation_delay(None).await;

        delegate_then_undelegate(&network, &session).await;

        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(
            network.ledger().account_owner(&session).await.unwrap(),
            Some(addr("DelegationProgram"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn propagation_override_replaces_configured_delay() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        network
            .set_propagation_delay(Some(Duration::from_secs(5)))
            .await;

        delegate_then_undelegate(&network, &session).await;

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(
            network.ledger().account_owner(&session).await.unwrap(),
            Some(addr("DelegationProgram"))
        );
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(
            network.ledger().account_owner(&session).await.unwrap(),
            Some(addr("AgentProgram"))
        );
    }

    #[tokio::test]
    async fn checkpoint_on_delegated_session_is_refused() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();
        ledger
            .submit(&session, SessionOperation::Delegate { owner: addr("owner") }, &addr("device"))
            .await
            .unwrap();

        let err = ledger
            .submit(
                &session,
                SessionOperation::CheckpointStatus {
                    market_pointer: 5,
                    fees: FeeAmounts::new(1, 2),
                },
                &addr("device"),
            )
            .await
            .unwrap_err();
        assert_eq!(err, VenueError::AccountDelegated(session));
    }

    #[tokio::test]
    async fn checkpoint_requires_device_key() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let err = network
            .ledger()
            .submit(
                &session,
                SessionOperation::CheckpointStatus {
                    market_pointer: 5,
                    fees: FeeAmounts::default(),
                },
                &addr("owner"),
            )
            .await
            .unwrap_err();
        assert_eq!(err, VenueError::Rejected(AuthorizationError::UnauthorizedKey));
    }

    #[tokio::test]
    async fn checkpoint_leaving_range_logs_alert() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();
        let sig = ledger
            .submit(
                &session,
                SessionOperation::CheckpointStatus {
                    market_pointer: 42,
                    fees: FeeAmounts::new(1, 2),
                },
                &addr("device"),
            )
            .await
            .unwrap();

        let receipt = ledger.receipt(&sig).await.unwrap().unwrap();
        assert!(receipt.logs[0].starts_with("ALERT"));
        let monitor = network.monitor_record(&session).await.unwrap();
        assert!(!monitor.in_range);
        assert_eq!(monitor.last_market_pointer, 42);
    }

    #[tokio::test]
    async fn injected_faults_are_consumed_once() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();
        network
            .fail_next(VenueKind::Ledger, "delegate", VenueError::transport("timeout"))
            .await;
        let op = SessionOperation::Delegate { owner: addr("owner") };

        assert!(ledger.submit(&session, op.clone(), &addr("device")).await.is_err());
        assert!(ledger.submit(&session, op, &addr("device")).await.is_ok());
        assert_eq!(network.count_submissions(VenueKind::Ledger, "delegate").await, 2);
    }

    #[tokio::test]
    async fn revoke_is_owner_only_and_terminal() {
        let network = SimulatedNetwork::new(config(false));
        let session = bootstrap(&network, 1_000).await;
        let ledger = network.ledger();

        assert!(ledger
            .submit(&session, SessionOperation::Revoke, &addr("device"))
            .await
            .is_err());
        ledger
            .submit(&session, SessionOperation::Revoke, &addr("owner"))
            .await
            .unwrap();
        let record = ledger.fetch_session(&session).await.unwrap().unwrap();
        assert!(!record.active);
    }
}
