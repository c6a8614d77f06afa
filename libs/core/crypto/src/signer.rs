// [libs/core/crypto/src/signer.rs]
//! Pluggable asymmetric signing: a post-quantum lattice primitive
//! (Dilithium) when available, RSA-SHA-256 as the permitted fallback
//! (spec §4.2, §9: "the primitive as pluggable and defers the choice to
//! a single config key").
//!
//! `verify` never panics on malformed input (spec §4.2's contract);
//! both arms return a plain `bool`.

use crate::errors::CryptoError;
use pqcrypto_dilithium::dilithium3;
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as _, SecretKey as _,
};
use rsa::pkcs1v15::{Signature as RsaSignature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use sha2::Sha256;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureBackend {
    Quantum,
    Legacy,
}

/// A generated keypair for one of the two backends. `public_key_bytes`
/// is what gets embedded in the minted token record; the private half
/// never leaves this type.
pub enum SignerKeyPair {
    Quantum {
        public_key: dilithium3::PublicKey,
        secret_key: dilithium3::SecretKey,
    },
    Legacy {
        private_key: RsaPrivateKey,
        public_key: RsaPublicKey,
    },
}

impl SignerKeyPair {
    pub fn backend(&self) -> SignatureBackend {
        match self {
            SignerKeyPair::Quantum { .. } => SignatureBackend::Quantum,
            SignerKeyPair::Legacy { .. } => SignatureBackend::Legacy,
        }
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            SignerKeyPair::Quantum { public_key, .. } => public_key.as_bytes().to_vec(),
            SignerKeyPair::Legacy { public_key, .. } => {
                VerifyingKey::<Sha256>::new(public_key.clone()).to_bytes()
            }
        }
    }

    /// Raw `(publicKey, secretKey)` bytes, for a process boundary that
    /// wants to persist a node's identity across invocations (spec §6's
    /// `keys/` layout). Only defined for `Quantum`: RSA DER encoding
    /// needs crate features this workspace doesn't otherwise pull in,
    /// and the pluggable-backend contract (spec §9) only requires one
    /// primitive to work end-to-end, not both to round-trip to disk.
    pub fn quantum_key_bytes(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        match self {
            SignerKeyPair::Quantum { public_key, secret_key } => {
                Some((public_key.as_bytes().to_vec(), secret_key.as_bytes().to_vec()))
            }
            SignerKeyPair::Legacy { .. } => None,
        }
    }

    pub fn from_quantum_key_bytes(public_key_bytes: &[u8], secret_key_bytes: &[u8]) -> Result<Self, CryptoError> {
        let public_key = dilithium3::PublicKey::from_bytes(public_key_bytes)
            .map_err(|_| CryptoError::SigningFailed("malformed dilithium public key".into()))?;
        let secret_key = dilithium3::SecretKey::from_bytes(secret_key_bytes)
            .map_err(|_| CryptoError::SigningFailed("malformed dilithium secret key".into()))?;
        Ok(SignerKeyPair::Quantum { public_key, secret_key })
    }
}

pub struct Signer;

impl Signer {
    pub fn generate(backend: SignatureBackend) -> Result<SignerKeyPair, CryptoError> {
        match backend {
            SignatureBackend::Quantum => {
                let (public_key, secret_key) = dilithium3::keypair();
                Ok(SignerKeyPair::Quantum { public_key, secret_key })
            }
            SignatureBackend::Legacy => {
                const RSA_KEY_BITS: usize = 2048;
                let mut rng = rand::thread_rng();
                let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
                    .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
                let public_key = RsaPublicKey::from(&private_key);
                Ok(SignerKeyPair::Legacy { private_key, public_key })
            }
        }
    }

    pub fn sign(keypair: &SignerKeyPair, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match keypair {
            SignerKeyPair::Quantum { secret_key, .. } => {
                let signature = dilithium3::detached_sign(message, secret_key);
                Ok(signature.as_bytes().to_vec())
            }
            SignerKeyPair::Legacy { private_key, .. } => {
                let signing_key = SigningKey::<Sha256>::new(private_key.clone());
                let signature = signing_key.sign(message);
                Ok(signature.to_vec())
            }
        }
    }

    /// Returns a boolean rather than a `Result`: validation must never
    /// throw for malformed input (spec §4.2's contract), it just fails.
    pub fn verify(
        backend: SignatureBackend,
        public_key_bytes: &[u8],
        message: &[u8],
        signature_bytes: &[u8],
    ) -> bool {
        match backend {
            SignatureBackend::Quantum => {
                let Ok(public_key) = dilithium3::PublicKey::from_bytes(public_key_bytes) else {
                    return false;
                };
                let Ok(signature) = dilithium3::DetachedSignature::from_bytes(signature_bytes) else {
                    return false;
                };
                dilithium3::verify_detached_signature(&signature, message, &public_key).is_ok()
            }
            SignatureBackend::Legacy => {
                let Ok(verifying_key) = VerifyingKey::<Sha256>::from_bytes(public_key_bytes) else {
                    return false;
                };
                let Ok(signature) = RsaSignature::try_from(signature_bytes) else {
                    return false;
                };
                verifying_key.verify(message, &signature).is_ok()
            }
        }
    }
}
