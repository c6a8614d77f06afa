// [libs/domain/sharder/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BIT SHARDER (C5)
 * CLASIFICACIÓN: CORE DOMAIN
 * RESPONSABILIDAD: VALIDACIÓN DE TOKEN, CLASIFICACIÓN, CIFRADO Y FRAGMENTACIÓN
 *
 * `shard()` es el único punto de entrada de fisión: valida el token
 * contra C3, clasifica el payload, lo cifra con AES-256-GCM usando una
 * clave simétrica de un solo uso, y emite `8 * len(cipher)` bit-atoms
 * determinísticos (spec §4.5). La reproducibilidad bit-exacta depende
 * enteramente de la semilla del PRNG: mismo payload, misma clave, misma
 * semilla, mismo resultado.
 * =================================================================
 */

pub mod classify;
pub mod errors;
pub mod shard;

pub use classify::{classify_payload, PayloadClass};
pub use errors::SharderError;
pub use shard::{shard, ShardResult};
