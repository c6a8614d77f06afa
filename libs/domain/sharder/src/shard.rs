// [libs/domain/sharder/src/shard.rs]
//! `shard()`: the C5 entry point (spec §4.5).

use atomic_core_crypto::aead::{encrypt_payload, KEY_LEN};
use atomic_domain_model::{Address, Atom, Level, Particle};
use atomic_domain_distribution::{plan, NodeAssignment, PredictionHook};
use atomic_domain_token_registry::{PresentedToken, TokenRegistry};
use chrono::Utc;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use uuid::Uuid;

use crate::classify::{classify_payload, PayloadClass};
use crate::errors::SharderError;

/// Spec §5 backpressure threshold: above this p99 append latency the
/// Bit Sharder refuses new shard requests rather than piling more bit
/// atoms onto an already-overloaded ledger.
pub const BACKPRESSURE_THRESHOLD_MS: f64 = 250.0;

#[derive(Debug, Clone)]
pub struct ShardResult {
    pub address: Address,
    pub class: PayloadClass,
    pub bit_atoms: Vec<Atom>,
    pub node_assignments: Vec<NodeAssignment>,
    pub degraded_placement: bool,
}

/// `shard(payload, tokenId, tokenBlob) -> ShardResult` (spec §4.5).
///
/// `seed` drives the per-bit frequency PRNG; callers that need bit-exact
/// reproducibility (tests, replay) pass a fixed seed, production callers
/// pass a freshly drawn one.
#[allow(clippy::too_many_arguments)]
pub fn shard(
    payload: &[u8],
    file_name: Option<&str>,
    registry: &TokenRegistry,
    presented: &PresentedToken,
    object_key: [u8; KEY_LEN],
    seed: u64,
    roster: &[String],
    hook: Option<&dyn PredictionHook>,
    ledger_write_latency_p99_ms: f64,
) -> Result<ShardResult, SharderError> {
    if ledger_write_latency_p99_ms > BACKPRESSURE_THRESHOLD_MS {
        return Err(SharderError::Backpressure {
            p99_ms: ledger_write_latency_p99_ms,
            threshold_ms: BACKPRESSURE_THRESHOLD_MS,
        });
    }
    if payload.is_empty() {
        return Err(SharderError::EmptyPayload);
    }

    // Step 1: validate the token (spec §4.5 step 1).
    let validation = registry.validate(presented);
    if !validation.valid {
        return Err(SharderError::AccessDenied(
            validation.reason.unwrap_or_else(|| "unspecified".to_string()),
        ));
    }
    let token = validation.token.expect("valid=true implies token is present");

    // Step 2: classify.
    let class = classify_payload(payload, file_name);

    // Step 3: encrypt with a freshly generated per-object symmetric key.
    let sealed = encrypt_payload(&object_key, payload)?;

    // Step 4: emit `8 * len(cipher)` bit atoms.
    let object_salt = Uuid::new_v4();
    let address = Address::derive(&token.token_class, &token.issuing_serial_number, &object_salt.to_string());
    let timestamp = Utc::now();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let total_bits = 8 * sealed.ciphertext.len() as u64;
    let bit_atoms: Vec<Atom> = (0..total_bits)
        .map(|i| {
            let byte = sealed.ciphertext[(i / 8) as usize];
            let bit = (byte >> (7 - (i % 8))) & 1;
            let frequency = rng.gen_range(1..=1000) as f64;
            Atom {
                level: Level::Bit,
                index: i,
                particle: Some(Particle::for_bit_index(i)),
                frequency,
                timestamp,
                token_id: token.token_id,
                iv: Some(sealed.iv.clone()),
                auth_tag: Some(sealed.auth_tag.clone()),
                encrypted_payload: Some(vec![bit]),
                constituents: Vec::new(),
                hash: atomic_domain_model::zero_hash(),
            }
        })
        .collect();

    // Step 5: ask C6 for placement.
    let outcome = plan(address, total_bits, token.token_id, roster, hook)?;

    Ok(ShardResult {
        address,
        class,
        bit_atoms,
        node_assignments: outcome.assignments,
        degraded_placement: outcome.degraded,
    })
}

impl From<atomic_domain_distribution::DistributionError> for SharderError {
    fn from(e: atomic_domain_distribution::DistributionError) -> Self {
        SharderError::AccessDenied(e.to_string())
    }
}
