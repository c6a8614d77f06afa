// [libs/core/crypto/src/errors.rs]
//! Error catalog for C2, in the teacher's tagged-variant style.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("[CRYPTO_AEAD_FAULT]: encryption failed")]
    EncryptionFailed,

    /// AEAD decryption fails closed on tag mismatch (spec §4.2).
    #[error("[CRYPTO_AEAD_FAULT]: authentication tag mismatch or tampered ciphertext")]
    DecryptionFailed,

    #[error("[CRYPTO_KEY_FAULT]: key material has the wrong length, expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("[CRYPTO_SIGN_FAULT]: signing operation failed: {0}")]
    SigningFailed(String),

    #[error("[CRYPTO_NONCE_FAULT]: nonce/iv has the wrong length, expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },
}
