//! The per-delegation authorization record and its program rules.
//!
//! A `Session` is only ever mutated by a venue applying an operation. The
//! orchestrator reads it but never changes it locally.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Address, Timestamp};

use super::{ActionCategory, AuthorizationError, StrategyMask};

/// Seed prefix for the session record address.
pub const SESSION_SEED: &[u8] = b"session";

/// Scoped authorization granted by an owner to an unattended device key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub owner: Address,
    pub device_key: Address,
    pub expires_at: Timestamp,
    pub max_exposure: u64,
    pub spent_exposure: u64,
    pub strategy_mask: StrategyMask,
    pub active: bool,
    pub action_count: u64,
    pub last_action_at: Timestamp,
}

impl Session {
    /// Builds a fresh, active session that expires `ttl_secs` after `now`.
    ///
    /// Fails with `Overflow` when the expiry is not representable.
    pub fn create(
        owner: Address,
        device_key: Address,
        ttl_secs: i64,
        max_exposure: u64,
        strategy_mask: StrategyMask,
        now: Timestamp,
    ) -> Result<Self, AuthorizationError> {
        let expires_at = now
            .plus_secs(ttl_secs)
            .ok_or(AuthorizationError::Overflow)?;
        Ok(Self {
            owner,
            device_key,
            expires_at,
            max_exposure,
            spent_exposure: 0,
            strategy_mask,
            active: true,
            action_count: 0,
            last_action_at: now,
        })
    }

    /// Address of the session record for `owner` under `program`.
    pub fn address_for(program: &Address, owner: &Address) -> Address {
        Address::derive(program, &[SESSION_SEED, owner.as_bytes()])
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    pub fn remaining_exposure(&self) -> u64 {
        self.max_exposure.saturating_sub(self.spent_exposure)
    }

    /// Checks liveness and that `signer` is the registered device key.
    pub fn ensure_device_signer(
        &self,
        signer: &Address,
        now: Timestamp,
    ) -> Result<(), AuthorizationError> {
        if !self.active {
            return Err(AuthorizationError::Inactive);
        }
        if self.is_expired(now) {
            return Err(AuthorizationError::Expired);
        }
        if signer != &self.device_key {
            return Err(AuthorizationError::UnauthorizedKey);
        }
        Ok(())
    }

    /// Applies a scoped action. On any rejection the record is untouched.
    pub fn execute_action(
        &mut self,
        signer: &Address,
        category: ActionCategory,
        amount: u64,
        now: Timestamp,
    ) -> Result<(), AuthorizationError> {
        self.ensure_device_signer(signer, now)?;

        if !self.strategy_mask.permits(category) {
            return Err(AuthorizationError::StrategyNotEnabled { category });
        }

        let new_spent = self
            .spent_exposure
            .checked_add(amount)
            .ok_or(AuthorizationError::Overflow)?;
        if amount > self.remaining_exposure() {
            return Err(AuthorizationError::ExposureLimitExceeded {
                requested: amount,
                spent: self.spent_exposure,
                max: self.max_exposure,
            });
        }
        let action_count = self
            .action_count
            .checked_add(1)
            .ok_or(AuthorizationError::Overflow)?;

        self.spent_exposure = new_spent;
        self.action_count = action_count;
        self.last_action_at = now;
        Ok(())
    }

    /// Terminally deactivates the session. Only the owner may revoke.
    pub fn revoke(&mut self, signer: &Address) -> Result<(), AuthorizationError> {
        if signer != &self.owner {
            return Err(AuthorizationError::UnauthorizedKey);
        }
        self.active = false;
        Ok(())
    }
}
