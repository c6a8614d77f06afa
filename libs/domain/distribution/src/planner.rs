// [libs/domain/distribution/src/planner.rs]
//! Deterministic round-robin fallback and the `plan()` entry point
//! (spec §4.6).

use atomic_domain_model::Address;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::DistributionError;
use crate::hook::PredictionHook;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeAssignment {
    pub node_id: String,
    /// Bit-atom indices, `0..bit_atom_count`, assigned to this node.
    pub atom_indices: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub assignments: Vec<NodeAssignment>,
    /// Set when the prediction hook was unreachable or absent and the
    /// round-robin fallback was used (spec §4.6, "logged as degraded mode").
    pub degraded: bool,
}

/// `plan(address, bitAtoms, tokenId) -> []NodeAssignment` (spec §4.6).
pub fn plan(
    address: Address,
    bit_atom_count: u64,
    token_id: Uuid,
    roster: &[String],
    hook: Option<&dyn PredictionHook>,
) -> Result<PlanOutcome, DistributionError> {
    if roster.is_empty() {
        return Err(DistributionError::NoNodesAvailable(address.to_hex()));
    }

    if let Some(hook) = hook {
        if let Some(assignments) = hook.predict(address, bit_atom_count, token_id, roster) {
            return Ok(PlanOutcome { assignments, degraded: false });
        }
        warn!(address = %address, "prediction hook unreachable, falling back to round-robin");
    }

    Ok(PlanOutcome { assignments: round_robin(bit_atom_count, roster), degraded: true })
}

/// Partitions `0..bit_atom_count` over `roster` so each node receives
/// `ceil(N/K)` atoms in insertion order (spec §4.6).
fn round_robin(bit_atom_count: u64, roster: &[String]) -> Vec<NodeAssignment> {
    let node_count = roster.len() as u64;
    let share = bit_atom_count.div_ceil(node_count);

    roster
        .iter()
        .enumerate()
        .map(|(i, node_id)| {
            let start = (i as u64) * share;
            let end = (start + share).min(bit_atom_count);
            let atom_indices = if start < end { (start..end).collect() } else { Vec::new() };
            NodeAssignment { node_id: node_id.clone(), atom_indices }
        })
        .collect()
}
