// [apps/atomic-cli/src/persistence.rs]
//! Cross-invocation state for the two directories the domain crates
//! themselves never touch (spec §6, "Persisted state layout"): `keys/`
//! (this node's signing identity) and `tokens/` (minted token state).
//! Every other directory under `ATOMIC_LEDGER_DIR` — `ledger/`,
//! `audit/`, `mining/` — is owned and written directly by its crate.

use std::fs;
use std::path::Path;

use atomic_core_crypto::{SignatureBackend, Signer, SignerKeyPair};
use atomic_domain_token_registry::{TokenRecordSnapshot, TokenRegistry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::failure::CliError;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedKeyPair {
    public_key: Vec<u8>,
    secret_key: Vec<u8>,
}

/// Loads this node's Dilithium keypair from `keys/<serial>.json`,
/// generating and persisting a fresh one on first run. RSA (`Legacy`)
/// keys are never persisted (see `SignerKeyPair::quantum_key_bytes`), so
/// `signer_backend` must name the `Quantum` backend; any other value is
/// rejected here rather than silently falling back to an unpersistable one.
pub fn load_or_generate_keypair(ledger_dir: &Path, node_serial: &str, signer_backend: &str) -> Result<SignerKeyPair, CliError> {
    if !signer_backend.eq_ignore_ascii_case("quantum") {
        return Err(CliError::input(format!(
            "unsupported ATOMIC_SIGNER_BACKEND {signer_backend:?}: only \"quantum\" supports cross-invocation key persistence"
        )));
    }
    let path = ledger_dir.join("keys").join(format!("{node_serial}.json"));

    if path.exists() {
        let raw = fs::read(&path).map_err(|e| CliError::io(format!("reading node keypair: {e}")))?;
        let persisted: PersistedKeyPair =
            serde_json::from_slice(&raw).map_err(|e| CliError::io(format!("decoding node keypair: {e}")))?;
        return SignerKeyPair::from_quantum_key_bytes(&persisted.public_key, &persisted.secret_key)
            .map_err(|e| CliError::io(format!("restoring node keypair: {e}")));
    }

    let keypair = Signer::generate(SignatureBackend::Quantum).map_err(|e| CliError::io(e.to_string()))?;
    let (public_key, secret_key) = keypair
        .quantum_key_bytes()
        .expect("Quantum backend always yields quantum key bytes");
    let persisted = PersistedKeyPair { public_key, secret_key };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CliError::io(format!("creating keys directory: {e}")))?;
    }
    let body = serde_json::to_vec_pretty(&persisted).expect("PersistedKeyPair always serializes");
    fs::write(&path, body).map_err(|e| CliError::io(format!("writing node keypair: {e}")))?;

    Ok(keypair)
}

fn tokens_dir(ledger_dir: &Path) -> std::path::PathBuf {
    ledger_dir.join("tokens")
}

pub fn persist_token(ledger_dir: &Path, snapshot: &TokenRecordSnapshot) -> Result<(), CliError> {
    let dir = tokens_dir(ledger_dir);
    fs::create_dir_all(&dir).map_err(|e| CliError::io(format!("creating tokens directory: {e}")))?;
    let path = dir.join(format!("{}.json", snapshot.token.token_id));
    let body = serde_json::to_vec_pretty(snapshot).expect("TokenRecordSnapshot always serializes");
    fs::write(&path, body).map_err(|e| CliError::io(format!("writing token snapshot: {e}")))
}

/// Rehydrates every token previously minted on this host into `registry`,
/// since `bond` operates over whatever tokens are currently live rather
/// than one the caller names explicitly.
pub fn rehydrate_all_tokens(ledger_dir: &Path, registry: &TokenRegistry) -> Result<(), CliError> {
    let dir = tokens_dir(ledger_dir);
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(&dir).map_err(|e| CliError::io(format!("listing tokens directory: {e}")))? {
        let entry = entry.map_err(|e| CliError::io(format!("reading tokens directory entry: {e}")))?;
        let raw = fs::read(entry.path()).map_err(|e| CliError::io(format!("reading token snapshot: {e}")))?;
        let snapshot: TokenRecordSnapshot =
            serde_json::from_slice(&raw).map_err(|e| CliError::io(format!("decoding token snapshot: {e}")))?;
        registry.rehydrate(snapshot);
    }
    Ok(())
}

/// Rehydrates exactly one token by id, for `fission`'s `--token`
/// argument. Returns `Ok(false)` (rather than an error) when no snapshot
/// exists, so the caller can report it as an invalid-token condition.
pub fn rehydrate_one_token(ledger_dir: &Path, registry: &TokenRegistry, token_id: Uuid) -> Result<bool, CliError> {
    let path = tokens_dir(ledger_dir).join(format!("{token_id}.json"));
    if !path.exists() {
        return Ok(false);
    }
    let raw = fs::read(&path).map_err(|e| CliError::io(format!("reading token snapshot: {e}")))?;
    let snapshot: TokenRecordSnapshot =
        serde_json::from_slice(&raw).map_err(|e| CliError::io(format!("decoding token snapshot: {e}")))?;
    registry.rehydrate(snapshot);
    Ok(true)
}
