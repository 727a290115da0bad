//! Where authority over a session record currently resides.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Address, StateMachine};

/// Derived from the owner program of the session record on the durable ledger.
///
/// Both the orchestrator and the periodic monitor consult this before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationLocation {
    /// Owned by the session program on the durable ledger.
    Durable,
    /// Owned by the delegation program; live copy is in the execution context.
    Ephemeral,
}

impl DelegationLocation {
    /// Infers the location from the record's current owner program.
    pub fn from_owner(owner: &Address, delegation_program: &Address) -> Self {
        if owner == delegation_program {
            DelegationLocation::Ephemeral
        } else {
            DelegationLocation::Durable
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, DelegationLocation::Ephemeral)
    }
}

impl StateMachine for DelegationLocation {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            DelegationLocation::Durable => vec![DelegationLocation::Ephemeral],
            DelegationLocation::Ephemeral => vec![DelegationLocation::Durable],
        }
    }
}

impl fmt::Display for DelegationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegationLocation::Durable => f.write_str("durable"),
            DelegationLocation::Ephemeral => f.write_str("ephemeral"),
        }
    }
}
