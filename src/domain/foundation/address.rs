//! Account and program addresses.
//!
//! Addresses are opaque strings on the wire. Program-derived record addresses
//! are computed from a program id and a list of seeds, so the owner of a
//! session can always recompute where its records live.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::ValidationError;

/// Address of an account, a program, or a signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Creates an address, rejecting empty or whitespace-containing input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::empty_field("address"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(
                "address",
                "must not contain whitespace",
            ));
        }
        Ok(Self(value))
    }

    /// Derives a record address owned by `program` from the given seeds.
    pub fn derive(program: &Address, seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update(program.0.as_bytes());
        hasher.update(b"ProgramDerivedAddress");
        let digest = hasher.finalize();
        Self(hex(&digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
