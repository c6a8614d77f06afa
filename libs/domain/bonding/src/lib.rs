// [libs/domain/bonding/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BONDING ENGINE & BOUNCE-RATE MONITOR (C7, C8)
 * CLASIFICACIÓN: CORE DOMAIN
 * RESPONSABILIDAD: FUSIÓN DE ATOMOS Y ESPEJO DE MINERÍA
 *
 * Un `Bonder` por (nivel L, dirección). Observa `countAvailable` de cada
 * canal de partícula en L-1 y, al alcanzar FANIN(L), funde los primeros
 * FANIN atomos de cada canal en un solo atomo de nivel L (spec §4.7).
 * El `MiningMirror` (C8) deriva `bounceRate` para cada atomo fundido y
 * puede reconstruirse bit-exacto a partir del ledger primario.
 * =================================================================
 */

pub mod bonder;
pub mod errors;
pub mod mirror;
pub mod validator;

pub use bonder::{BondOutcome, Bonder, BonderState};
pub use errors::BondingError;
pub use mirror::MiningMirror;
pub use validator::validate_constituents;
