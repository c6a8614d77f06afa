// [libs/domain/token-registry/src/identity.rs]
//! Hardware serial identity (spec §4.3: "checks that the caller process
//! can read the hardware serial identity").

use crate::errors::TokenRegistryError;

/// The serial number of the node this process is running on. Read once
/// at startup from `ATOMIC_NODE_SERIAL`; a node that cannot read its own
/// identity cannot mint or validate tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub serial_number: String,
}

impl NodeIdentity {
    pub fn from_env() -> Result<Self, TokenRegistryError> {
        let serial_number = std::env::var("ATOMIC_NODE_SERIAL")
            .map_err(|_| TokenRegistryError::IdentityUnreadable("ATOMIC_NODE_SERIAL not set".into()))?;
        if serial_number.trim().is_empty() {
            return Err(TokenRegistryError::IdentityUnreadable("serial number is empty".into()));
        }
        Ok(Self { serial_number })
    }

    pub fn new(serial_number: impl Into<String>) -> Self {
        Self { serial_number: serial_number.into() }
    }
}
