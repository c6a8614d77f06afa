// [libs/domain/model/src/hashing.rs]
//! Content hashing shared by the ledger hash chain and atom tamper detection.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 digest, hex-encoded at the serialization boundary so
/// ledger log files stay human-diffable (spec §6's canonical record body).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash32(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl Hash32 {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The sentinel `prevHash` for the first entry of any per-(address, level,
/// particle) log (spec §8, P2).
pub fn zero_hash() -> Hash32 {
    Hash32([0u8; 32])
}

/// `entryHash = H(prevHash ‖ canonical(body))` (spec §3, Ledger Entry).
pub fn chain_hash(prev_hash: &Hash32, canonical_body: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(canonical_body);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash32(out)
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let decoded = hex::decode(&s).map_err(serde::de::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom("hash must be exactly 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_hash_is_deterministic() {
        let prev = zero_hash();
        let a = chain_hash(&prev, b"body");
        let b = chain_hash(&prev, b"body");
        assert_eq!(a, b);
    }

    #[test]
    fn chain_hash_differs_on_prev() {
        let a = chain_hash(&zero_hash(), b"body");
        let other_prev = chain_hash(&zero_hash(), b"seed");
        let b = chain_hash(&other_prev, b"body");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_json() {
        let h = chain_hash(&zero_hash(), b"round-trip");
        let json = serde_json::to_string(&h).unwrap();
        let back: Hash32 = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
