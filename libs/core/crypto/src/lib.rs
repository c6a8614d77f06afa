// [libs/core/crypto/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CRYPTOGRAPHIC SERVICES CORE (C2)
 * CLASIFICACIÓN: CORE SECURITY
 * RESPONSABILIDAD: AEAD, HMAC DE MANIPULACIÓN Y FIRMA PLUGGABLE
 *
 * Implementa el contrato de §4.2: cifrado autenticado para la carga útil
 * de los bit-atoms, HMAC-SHA-512 sobre el cuerpo de las entradas del
 * ledger, y firma/verificación asimétrica con primitiva intercambiable
 * (post-cuántica por defecto, RSA como respaldo — spec §9 deja la
 * elección como una única clave de configuración).
 * =================================================================
 */

pub mod aead;
pub mod errors;
pub mod key_rotation;
pub mod signer;
pub mod tamper;

pub use aead::{decrypt_payload, encrypt_payload, EncryptedPayload};
pub use errors::CryptoError;
pub use key_rotation::{KeyRotationLog, KeyRotationRecord};
pub use signer::{SignatureBackend, Signer, SignerKeyPair};
pub use tamper::{tamper_key, verify_tamper_key};
