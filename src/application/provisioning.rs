//! Owner-side setup of the session and its position monitor.
//!
//! Runs once before the orchestrator or the monitor touch the session. A
//! session that already exists on the ledger is left as it is.

use crate::domain::session::StrategyMask;
use crate::ports::{SessionOperation, SessionVenue, VenueError};

use super::binding::SessionBinding;
use super::errors::WorkflowError;
use super::verification::SubmissionVerifier;

/// Terms the owner grants the device key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTerms {
    pub ttl_secs: i64,
    pub max_exposure: u64,
    pub strategy_mask: StrategyMask,
    pub range_low: i32,
    pub range_high: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyPresent,
}

/// Creates the session and registers its monitor, both owner-signed.
pub async fn provision_session(
    ledger: &dyn SessionVenue,
    verifier: &SubmissionVerifier,
    binding: &SessionBinding,
    terms: SessionTerms,
) -> Result<Provisioned, WorkflowError> {
    let created = verifier
        .submit(
            ledger,
            &binding.session,
            SessionOperation::CreateSession {
                device_key: binding.device_key.clone(),
                ttl_secs: terms.ttl_secs,
                max_exposure: terms.max_exposure,
                strategy_mask: terms.strategy_mask,
            },
            &binding.owner,
        )
        .await;

    match created {
        Ok(_) => {}
        Err(WorkflowError::Venue(VenueError::AlreadyExists(_))) => {
            tracing::info!(session = %binding.session, "Session already provisioned");
            return Ok(Provisioned::AlreadyPresent);
        }
        Err(err) => return Err(err),
    }

    verifier
        .submit(
            ledger,
            &binding.session,
            SessionOperation::RegisterMonitor {
                range_low: terms.range_low,
                range_high: terms.range_high,
            },
            &binding.owner,
        )
        .await?;

    tracing::info!(
        session = %binding.session,
        monitor = %binding.monitor,
        max_exposure = terms.max_exposure,
        strategy_mask = terms.strategy_mask.bits(),
        "Session provisioned"
    );
    Ok(Provisioned::Created)
}
