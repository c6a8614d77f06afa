// [libs/domain/token-registry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TOKEN REGISTRY (C3)
 * CLASIFICACIÓN: CORE DOMAIN
 * RESPONSABILIDAD: CICLO DE VIDA DEL TOKEN DE PRUEBA-DE-ACCESO
 *
 * Único componente autorizado a mutar el estado de un token (spec §3,
 * "Ownership"). Mint liga la cotización de carbono de C4 al momento de
 * emisión; validate nunca lanza sobre entradas corruptas, retorna un
 * valor `{valid, reason}`.
 * =================================================================
 */

pub mod errors;
pub mod identity;
pub mod registry;
pub mod wire;

pub use errors::TokenRegistryError;
pub use identity::NodeIdentity;
pub use registry::{AllocationReceipt, TokenRecordSnapshot, TokenRegistry, TokenValidation};
pub use wire::{PresentedToken, TokenPayload};
