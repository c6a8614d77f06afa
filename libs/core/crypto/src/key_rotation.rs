// [libs/core/crypto/src/key_rotation.rs]
//! Key rotation audit trail (SPEC_FULL §11): rotation is supported and
//! logged, never silent, mirroring the teacher's pattern of auditing
//! every mutation of sensitive state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRotationRecord {
    pub rotated_at: DateTime<Utc>,
    pub previous_key_fingerprint: String,
    pub new_key_fingerprint: String,
}

pub fn key_fingerprint(key_material: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key_material);
    hex::encode(hasher.finalize())
}

/// Appends one newline-delimited JSON record per rotation to
/// `keys/rotation.log`. Rotation is exclusive and serialized per spec §5
/// ("Crypto keys ... rotation is exclusive and serialized"); this type
/// assumes its caller already holds that exclusivity.
pub struct KeyRotationLog {
    path: PathBuf,
}

impl KeyRotationLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, record: &KeyRotationRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record).expect("record is always serializable");
        writeln!(file, "{line}")?;
        file.sync_all()
    }

    pub fn read_all(&self) -> std::io::Result<Vec<KeyRotationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("rotation log entries are self-written"))
            .collect())
    }
}

pub fn record_rotation(log_path: &Path, previous_key: &[u8], new_key: &[u8]) -> std::io::Result<()> {
    let record = KeyRotationRecord {
        rotated_at: Utc::now(),
        previous_key_fingerprint: key_fingerprint(previous_key),
        new_key_fingerprint: key_fingerprint(new_key),
    };
    KeyRotationLog::at(log_path).append(&record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_rotations_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("rotation.log");
        record_rotation(&log_path, b"key-v1", b"key-v2").unwrap();
        record_rotation(&log_path, b"key-v2", b"key-v3").unwrap();

        let records = KeyRotationLog::at(&log_path).read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].new_key_fingerprint, key_fingerprint(b"key-v2"));
        assert_eq!(records[1].previous_key_fingerprint, key_fingerprint(b"key-v2"));
    }
}
