// [libs/core/crypto/src/aead.rs]
//! Authenticated symmetric encryption for bit-atom payloads (spec §4.2, §4.5).

use crate::errors::CryptoError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// A freshly generated per-object symmetric key (spec §4.5 step 3).
pub fn generate_object_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// The three fields the spec's Atom record carries for bit atoms:
/// `iv`, `authTag`, `encryptedPayload` (spec §3), kept separate rather
/// than as the concatenated buffer `aes-gcm` returns by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub iv: Vec<u8>,
    pub auth_tag: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

pub fn encrypt_payload(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let iv = generate_nonce();
    let nonce = Nonce::from_slice(&iv);

    let mut sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    // `aes-gcm` appends the 16-byte tag to the ciphertext; split it back
    // out so the Atom record can carry `authTag` as its own field.
    let tag_offset = sealed.len() - TAG_LEN;
    let auth_tag = sealed.split_off(tag_offset);

    Ok(EncryptedPayload {
        iv: iv.to_vec(),
        auth_tag,
        ciphertext: sealed,
    })
}

/// Fails closed on tag mismatch: any corruption of `ciphertext`, `iv`, or
/// `auth_tag` returns `Err` rather than garbage plaintext (spec §4.2, §8 P6).
pub fn decrypt_payload(key: &[u8; KEY_LEN], payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
    if payload.iv.len() != NONCE_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_LEN,
            actual: payload.iv.len(),
        });
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(&payload.iv);

    let mut sealed = Vec::with_capacity(payload.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&payload.ciphertext);
    sealed.extend_from_slice(&payload.auth_tag);

    cipher
        .decrypt(nonce, sealed.as_ref())
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_bit_exact() {
        let key = generate_object_key();
        let plaintext = b"ATOMIC bit-atom payload";
        let sealed = encrypt_payload(&key, plaintext).unwrap();
        let opened = decrypt_payload(&key, &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let key = generate_object_key();
        let mut sealed = encrypt_payload(&key, b"payload").unwrap();
        sealed.ciphertext[0] ^= 0xFF;
        assert!(decrypt_payload(&key, &sealed).is_err());
    }

    #[test]
    fn tampered_auth_tag_fails_closed() {
        let key = generate_object_key();
        let mut sealed = encrypt_payload(&key, b"payload").unwrap();
        sealed.auth_tag[0] ^= 0xFF;
        assert!(decrypt_payload(&key, &sealed).is_err());
    }

    #[test]
    fn tampered_iv_fails_closed() {
        let key = generate_object_key();
        let mut sealed = encrypt_payload(&key, b"payload").unwrap();
        sealed.iv[0] ^= 0xFF;
        assert!(decrypt_payload(&key, &sealed).is_err());
    }

    #[test]
    fn wrong_key_fails_closed() {
        let key = generate_object_key();
        let other_key = generate_object_key();
        let sealed = encrypt_payload(&key, b"payload").unwrap();
        assert!(decrypt_payload(&other_key, &sealed).is_err());
    }
}
