// [libs/infra/ledger/src/audit.rs]
//! Per-address audit chain (spec §6): `{op, L, P, atomIndex, tokenId,
//! timestamp, prevHash, entryHash}` records. Independent of the
//! per-(level,particle) atom logs `LedgerStore` owns — this is the
//! higher-level "what operation touched this address, and when" trail,
//! not the atom payload itself.

use std::fs;
use std::path::PathBuf;

use atomic_domain_model::{hashing::chain_hash, zero_hash, Address, Hash32, Level, Particle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::key::LogKey;
use crate::record::{frame_record, parse_records};
use crate::store::atomic_write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOp {
    Fission,
    Bond,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub op: AuditOp,
    pub level: Level,
    pub particle: Option<Particle>,
    pub atom_index: u64,
    pub token_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

pub struct AuditLog {
    root: PathBuf,
}

impl AuditLog {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, address: Address) -> PathBuf {
        self.root.join(address.as_path_component()).join("audit.log")
    }

    /// Appends one chained record, linking `prevHash` to the address's
    /// prior audit entry (spec §6). A failure here does not roll back
    /// any atom-log append the caller already made; the audit chain is
    /// a trail, not a two-phase commit participant.
    pub fn append(&self, address: Address, record: AuditRecord) -> Result<Hash32, LedgerError> {
        let path = self.path(address);
        let io_key = || LogKey::new(address, record.level, record.particle);

        let mut existing = if path.exists() {
            fs::read(&path).map_err(|source| LedgerError::Io { log: io_key(), source })?
        } else {
            Vec::new()
        };

        let prev_hash = parse_records(&existing).last().map(|(_, hash)| *hash).unwrap_or_else(zero_hash);

        let body = serde_json::to_vec(&record)?;
        let entry_hash = chain_hash(&prev_hash, &body);
        existing.extend(frame_record(&body, entry_hash));

        atomic_write(&path, &existing).map_err(|source| LedgerError::Io { log: io_key(), source })?;
        Ok(entry_hash)
    }

    /// Replays every record for `address`, re-validating the hash chain.
    pub fn read_all(&self, address: Address) -> Result<Vec<AuditRecord>, LedgerError> {
        let path = self.path(address);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let buffer = fs::read(&path).map_err(|source| {
            LedgerError::Io { log: LogKey::new(address, Level::Bit, None), source }
        })?;

        let mut prev_hash = zero_hash();
        let mut records = Vec::new();
        for (body, hash) in parse_records(&buffer) {
            let expected = chain_hash(&prev_hash, &body);
            if expected != hash {
                return Err(LedgerError::Invariant {
                    log: LogKey::new(address, Level::Bit, None),
                    reason: "audit chain hash break".into(),
                });
            }
            prev_hash = hash;
            records.push(serde_json::from_slice(&body)?);
        }
        Ok(records)
    }
}
