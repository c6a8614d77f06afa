// [libs/domain/token-registry/src/wire.rs]
//! Token presentation wire format (spec §6): `{tokenId, encryptedBlob}`
//! where the blob decrypts to `{tokenId, classTag, serialNumber, nonce}`.

use atomic_core_crypto::{decrypt_payload, encrypt_payload, EncryptedPayload};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenRegistryError;

/// The plaintext sealed inside a presented token's `encryptedBlob`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    pub token_id: Uuid,
    pub class_tag: String,
    pub serial_number: String,
    pub nonce: String,
}

/// What a caller hands the registry at the operation boundary: the
/// claimed id plus the base64 encrypted blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentedToken {
    pub token_id: Uuid,
    pub encrypted_blob: String,
}

impl PresentedToken {
    pub fn seal(key: &[u8; 32], payload: &TokenPayload) -> Result<Self, TokenRegistryError> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| TokenRegistryError::MalformedPresentation(e.to_string()))?;
        let sealed = encrypt_payload(key, &plaintext)?;
        let blob = serde_json::to_vec(&sealed)
            .map_err(|e| TokenRegistryError::MalformedPresentation(e.to_string()))?;
        Ok(PresentedToken {
            token_id: payload.token_id,
            encrypted_blob: BASE64.encode(blob),
        })
    }

    /// Decrypts and decodes the blob. Never panics on malformed input —
    /// every failure funnels into `MalformedPresentation` (spec §4.3's
    /// "fails with `TokenInvalid{reason}`" contract applies one layer up,
    /// in `TokenRegistry::validate`).
    pub fn open(&self, key: &[u8; 32]) -> Result<TokenPayload, TokenRegistryError> {
        let blob = BASE64
            .decode(&self.encrypted_blob)
            .map_err(|e| TokenRegistryError::MalformedPresentation(e.to_string()))?;
        let sealed: EncryptedPayload = serde_json::from_slice(&blob)
            .map_err(|e| TokenRegistryError::MalformedPresentation(e.to_string()))?;
        let plaintext = decrypt_payload(key, &sealed)?;
        let payload: TokenPayload = serde_json::from_slice(&plaintext)
            .map_err(|e| TokenRegistryError::MalformedPresentation(e.to_string()))?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open_round_trips() {
        let key = atomic_core_crypto::aead::generate_object_key();
        let payload = TokenPayload {
            token_id: Uuid::nil(),
            class_tag: "HQ".into(),
            serial_number: "S-1".into(),
            nonce: "abc123".into(),
        };
        let presented = PresentedToken::seal(&key, &payload).unwrap();
        let opened = presented.open(&key).unwrap();
        assert_eq!(opened, payload);
    }

    #[test]
    fn corrupted_blob_fails_closed() {
        let key = atomic_core_crypto::aead::generate_object_key();
        let payload = TokenPayload {
            token_id: Uuid::nil(),
            class_tag: "HQ".into(),
            serial_number: "S-1".into(),
            nonce: "abc123".into(),
        };
        let mut presented = PresentedToken::seal(&key, &payload).unwrap();
        presented.encrypted_blob.push('!');
        assert!(presented.open(&key).is_err());
    }
}
