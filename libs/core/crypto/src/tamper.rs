// [libs/core/crypto/src/tamper.rs]
//! HMAC-SHA-512 tamper keys over ledger entry bodies (spec §4.2).

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Computes the tamper key for a ledger entry's canonical body. This is a
/// second, keyed integrity check layered on top of the SHA-256 hash chain
/// (spec §3's `entryHash`): the hash chain detects reordering/truncation,
/// the HMAC additionally proves the body wasn't forged without the node's
/// per-node key.
pub fn tamper_key(node_key: &[u8], canonical_body: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha512::new_from_slice(node_key).expect("HMAC accepts keys of any length");
    mac.update(canonical_body);
    mac.finalize().into_bytes().to_vec()
}

pub fn verify_tamper_key(node_key: &[u8], canonical_body: &[u8], presented_tag: &[u8]) -> bool {
    let mut mac = HmacSha512::new_from_slice(node_key).expect("HMAC accepts keys of any length");
    mac.update(canonical_body);
    mac.verify_slice(presented_tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_its_own_tag() {
        let key = b"node-secret-key";
        let body = b"canonical ledger body";
        let tag = tamper_key(key, body);
        assert!(verify_tamper_key(key, body, &tag));
    }

    #[test]
    fn rejects_tampered_body() {
        let key = b"node-secret-key";
        let tag = tamper_key(key, b"original body");
        assert!(!verify_tamper_key(key, b"mutated body", &tag));
    }

    #[test]
    fn rejects_wrong_key() {
        let body = b"canonical ledger body";
        let tag = tamper_key(b"key-one", body);
        assert!(!verify_tamper_key(b"key-two", body, &tag));
    }
}
