// [libs/domain/distribution/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DISTRIBUTION PLANNER (C6)
 * CLASIFICACIÓN: CORE DOMAIN
 * RESPONSABILIDAD: ASIGNACIÓN DE BIT-ATOMS A NODOS
 *
 * `plan()` delega primero a un hook de predicción pluggable; si el hook
 * no está disponible, cae a un round-robin determinista sobre el roster
 * configurado, registrando la caída como modo degradado (spec §4.6).
 * =================================================================
 */

pub mod errors;
pub mod hook;
pub mod planner;

pub use errors::DistributionError;
pub use hook::PredictionHook;
pub use planner::{plan, NodeAssignment, PlanOutcome};
