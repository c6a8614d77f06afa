// [libs/domain/distribution/src/hook.rs]
//! The prediction hook `plan()` tries before falling back to round-robin
//! (spec §4.6). Kept as a trait so the orchestrator can wire in a real
//! predictive placement service without this crate depending on it.

use atomic_domain_model::Address;
use uuid::Uuid;

use crate::planner::NodeAssignment;

pub trait PredictionHook {
    /// Returns `None` when the hook is unreachable or declines to place;
    /// `plan()` treats that as "hook unreachable" and falls back, logged
    /// as degraded mode (spec §4.6).
    fn predict(
        &self,
        address: Address,
        bit_atom_count: u64,
        token_id: Uuid,
        roster: &[String],
    ) -> Option<Vec<NodeAssignment>>;
}
