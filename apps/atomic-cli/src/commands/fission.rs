// [apps/atomic-cli/src/commands/fission.rs]
//! `fission --token <id> --blob <b64> (--data <bytes>|--file <path>)`
//! (C9, spec §4.9): validate, classify, shard, distribute, then append
//! both the per-bit-atom ledger entries and one audit-chain record for
//! the batch.

use std::path::PathBuf;

use atomic_core_crypto::aead::generate_object_key;
use atomic_domain_model::Level;
use atomic_domain_sharder::{shard, SharderError};
use atomic_domain_token_registry::{NodeIdentity, PresentedToken, TokenRegistry};
use atomic_infra_ledger::{AuditLog, AuditOp, AuditRecord, LedgerStore};
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::directives::AtomicDirectives;
use crate::failure::CliError;
use crate::persistence;

#[allow(clippy::too_many_arguments)]
pub fn run(
    directives: &AtomicDirectives,
    token: Uuid,
    blob: String,
    data: Option<String>,
    file: Option<PathBuf>,
) -> Result<Value, CliError> {
    let (payload, file_name) = read_input(data, file)?;

    let keypair = persistence::load_or_generate_keypair(&directives.ledger_dir, &directives.node_serial, &directives.signer_backend)?;
    let identity = NodeIdentity::new(directives.node_serial.clone());
    let registry = TokenRegistry::new(identity, keypair);

    let found = persistence::rehydrate_one_token(&directives.ledger_dir, &registry, token)?;
    if !found {
        return Err(CliError::invalid_token(format!("no persisted token record for {token}")));
    }

    let presented = PresentedToken { token_id: token, encrypted_blob: blob };
    let object_key = generate_object_key();
    let seed: u64 = rand::thread_rng().gen();

    let ledger = LedgerStore::open(directives.ledger_dir.join("ledger"));

    let result = shard(
        &payload,
        file_name.as_deref(),
        &registry,
        &presented,
        object_key,
        seed,
        &directives.node_roster,
        None,
        ledger.write_latency_p99(),
    )
    .map_err(map_sharder_error)?;

    let bit_atom_count = result.bit_atoms.len() as u64;
    for atom in &result.bit_atoms {
        ledger
            .append(result.address, Level::Bit, atom.particle, atom.clone())
            .map_err(|e| CliError::io(format!("ledger append failed: {e}")))?;
    }

    let audit = AuditLog::open(directives.ledger_dir.join("audit"));
    audit
        .append(
            result.address,
            AuditRecord {
                op: AuditOp::Fission,
                level: Level::Bit,
                particle: None,
                atom_index: bit_atom_count,
                token_id: token,
                timestamp: Utc::now(),
            },
        )
        .map_err(|e| CliError::io(format!("audit append failed: {e}")))?;

    info!(address = %result.address, bit_atoms = bit_atom_count, "fission complete");

    Ok(json!({
        "address": result.address.to_hex(),
        "bitAtoms": bit_atom_count,
        "nodeAssignments": result.node_assignments,
        "classification": {
            "typeTag": result.class.type_tag,
            "sizeKb": result.class.size_kb,
        },
        "degradedPlacement": result.degraded_placement,
    }))
}

fn read_input(data: Option<String>, file: Option<PathBuf>) -> Result<(Vec<u8>, Option<String>), CliError> {
    match (data, file) {
        (Some(_), Some(_)) => Err(CliError::input("exactly one of --data or --file is required, not both")),
        (None, None) => Err(CliError::input("one of --data or --file is required")),
        (Some(raw), None) => Ok((raw.into_bytes(), None)),
        (None, Some(path)) => {
            let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned());
            let bytes = std::fs::read(&path).map_err(|e| CliError::io(format!("reading {}: {e}", path.display())))?;
            Ok((bytes, file_name))
        }
    }
}

fn map_sharder_error(error: SharderError) -> CliError {
    match error {
        SharderError::AccessDenied(reason) => CliError::invalid_token(reason),
        SharderError::EmptyPayload => CliError::input("refusing to shard a zero-byte payload"),
        SharderError::Backpressure { p99_ms, threshold_ms } => {
            CliError::io(format!("ledger write latency p99 {p99_ms:.1}ms exceeds {threshold_ms:.1}ms, refusing new shard request"))
        }
        SharderError::Crypto(e) => CliError::io(e.to_string()),
    }
}
