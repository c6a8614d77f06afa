// [libs/domain/model/src/address.rs]
//! Opaque per-registration identifier (spec §3, "Address").

use crate::hashing::Hash32;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// `hash(nodeType ‖ corporateId ‖ uniqueSalt)`. Created once at first
/// registration and never rewritten; uniqueness is enforced by the Token
/// Registry (C3), not by this type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Hash32);

impl Address {
    pub fn derive(node_type: &str, corporate_id: &str, unique_salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(node_type.as_bytes());
        hasher.update(b"\xe2\x80\x96"); // U+2016 DOUBLE VERTICAL LINE, the spec's `‖` separator
        hasher.update(corporate_id.as_bytes());
        hasher.update(b"\xe2\x80\x96");
        hasher.update(unique_salt.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Address(Hash32::from_bytes(bytes))
    }

    pub fn to_hex(self) -> String {
        self.0.to_hex()
    }

    /// Parses the hex form `to_hex` produces, for callers (the CLI) that
    /// only hold an address by its printed representation.
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        let decoded = hex::decode(hex_str).map_err(|e| e.to_string())?;
        let bytes: [u8; 32] = decoded
            .try_into()
            .map_err(|_| "address must decode to exactly 32 bytes".to_string())?;
        Ok(Address(Hash32::from_bytes(bytes)))
    }

    /// Filesystem-safe path component for the on-disk ledger layout (spec §6).
    pub fn as_path_component(self) -> String {
        self.to_hex()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = Address::derive("HQ", "corp-1", "salt-a");
        let b = Address::derive("HQ", "corp-1", "salt-a");
        assert_eq!(a, b);
    }

    #[test]
    fn hex_round_trips() {
        let address = Address::derive("HQ", "corp-1", "salt-a");
        let parsed = Address::from_hex(&address.to_hex()).unwrap();
        assert_eq!(address, parsed);
    }

    #[test]
    fn distinct_salts_differ() {
        let a = Address::derive("HQ", "corp-1", "salt-a");
        let b = Address::derive("HQ", "corp-1", "salt-b");
        assert_ne!(a, b);
    }
}
