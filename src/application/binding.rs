//! The session this process signs for.

use crate::domain::foundation::Address;
use crate::domain::session::{PositionMonitorRecord, Session};

/// Addresses and keys shared by the orchestrator and the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub owner: Address,
    pub device_key: Address,
    pub session: Address,
    pub monitor: Address,
    pub delegation_program: Address,
}

impl SessionBinding {
    /// Derives the session and monitor record addresses for `owner`.
    pub fn derive(
        program: &Address,
        delegation_program: Address,
        owner: Address,
        device_key: Address,
    ) -> Self {
        let session = Session::address_for(program, &owner);
        let monitor = PositionMonitorRecord::address_for(program, &session);
        Self {
            owner,
            device_key,
            session,
            monitor,
            delegation_program,
        }
    }
}
