// [libs/domain/bonding/src/mirror.rs]
//! Bounce-Rate Monitor (C8): derives `bounceRate` for every new ledger
//! entry and persists it to the mining-ledger mirror (spec §4.8). The
//! mirror is a derived, truncatable view — `rebuild` regenerates it from
//! the primary ledger and must be bit-exact.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use atomic_domain_model::{Address, BounceRate, Level, Particle};
use atomic_infra_ledger::{LedgerError, LedgerStore, LogKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorRecord {
    pub atom_index: u64,
    pub frequency: f64,
    pub bounce_rate: BounceRate,
}

pub struct MiningMirror {
    root: PathBuf,
}

impl MiningMirror {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn mirror_path(&self, address: Address, level: Level, particle: Option<Particle>) -> PathBuf {
        let segment = particle.map(|p| p.as_str().to_string()).unwrap_or_else(|| "combined".to_string());
        self.root.join(address.as_path_component()).join(level.as_str()).join(format!("{segment}.mirror"))
    }

    /// Push-path: called right after a successful append (spec §4.8,
    /// "on append notification"). Appends one JSON line; the mirror
    /// itself carries no hash chain, since it is wholly derived.
    pub fn record_append(&self, address: Address, level: Level, particle: Option<Particle>, atom_index: u64, frequency: f64) -> std::io::Result<()> {
        let record = MirrorRecord { atom_index, frequency, bounce_rate: BounceRate::from_frequency(frequency) };
        let path = self.mirror_path(address, level, particle);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(&record).expect("mirror record is always serializable");
        writeln!(file, "{line}")
    }

    /// Pull-path: timed scan every `POLL_MS` (spec §4.8 default 5000 ms).
    /// Recomputes bounce-rate for every atom not yet mirrored by
    /// comparing the primary ledger's count against the mirror's.
    pub fn scan(&self, store: &LedgerStore, address: Address, level: Level, particle: Option<Particle>) -> Result<u64, LedgerError> {
        let mirrored = self.read_all(address, level, particle).len() as u64;
        let atoms = store.read_range(address, level, particle, mirrored, u64::MAX)?;
        let count = atoms.len() as u64;
        for atom in &atoms {
            self.record_append(address, level, particle, atom.index, atom.frequency)
                .map_err(|source| LedgerError::Io { log: LogKey::new(address, level, particle), source })?;
        }
        Ok(count)
    }

    pub fn read_all(&self, address: Address, level: Level, particle: Option<Particle>) -> Vec<MirrorRecord> {
        let path = self.mirror_path(address, level, particle);
        let Ok(contents) = fs::read_to_string(path) else { return Vec::new() };
        contents
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }

    /// Rebuilds the mirror for one log entirely from the primary ledger.
    /// Must be bit-exact (spec §4.8): discards any existing mirror file
    /// first so a partial or stale mirror can't leak into the rebuild.
    pub fn rebuild(&self, store: &LedgerStore, address: Address, level: Level, particle: Option<Particle>) -> Result<(), LedgerError> {
        let path = self.mirror_path(address, level, particle);
        let _ = fs::remove_file(&path);
        let atoms = store.read_range(address, level, particle, 0, u64::MAX)?;
        for atom in atoms {
            self.record_append(address, level, particle, atom.index, atom.frequency)
                .map_err(|source| LedgerError::Io { log: LogKey::new(address, level, particle), source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_domain_model::zero_hash;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn sample_atom(index: u64, frequency: f64) -> atomic_domain_model::Atom {
        atomic_domain_model::Atom {
            level: Level::Bit,
            index,
            particle: Some(Particle::Proton),
            frequency,
            timestamp: Utc::now(),
            token_id: Uuid::nil(),
            iv: None,
            auth_tag: None,
            encrypted_payload: Some(vec![1]),
            constituents: Vec::new(),
            hash: zero_hash(),
        }
    }

    #[test]
    fn rebuild_matches_primary_ledger_bit_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("ledger"));
        let mirror = MiningMirror::open(dir.path().join("mining"));
        let address = Address::derive("HQ", "corp", "salt");

        store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0, 500.0)).unwrap();
        store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0, 250.0)).unwrap();

        mirror.rebuild(&store, address, Level::Bit, Some(Particle::Proton)).unwrap();
        let records = mirror.read_all(address, Level::Bit, Some(Particle::Proton));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bounce_rate, BounceRate::Finite(2.0));
        assert_eq!(records[1].bounce_rate, BounceRate::Finite(4.0));
    }

    proptest! {
        /// P5 (bounce law): for any positive frequency, a mirrored atom's
        /// `bounceRate` is `1000 / frequency`; at or below zero it is the
        /// non-finite sentinel instead of a division result.
        #[test]
        fn p5_bounce_rate_matches_frequency_law(frequency in 0.01f64..10_000.0) {
            let dir = tempfile::tempdir().unwrap();
            let store = LedgerStore::open(dir.path().join("ledger"));
            let mirror = MiningMirror::open(dir.path().join("mining"));
            let address = Address::derive("HQ", "corp", "salt");

            store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0, frequency)).unwrap();
            mirror.rebuild(&store, address, Level::Bit, Some(Particle::Proton)).unwrap();

            let records = mirror.read_all(address, Level::Bit, Some(Particle::Proton));
            prop_assert_eq!(records.len(), 1);
            prop_assert_eq!(records[0].bounce_rate, BounceRate::Finite(atomic_domain_model::atom::round2(1000.0 / frequency)));
        }

        #[test]
        fn p5_non_positive_frequency_is_the_infinite_sentinel(frequency in -1000.0f64..=0.0) {
            let dir = tempfile::tempdir().unwrap();
            let store = LedgerStore::open(dir.path().join("ledger"));
            let mirror = MiningMirror::open(dir.path().join("mining"));
            let address = Address::derive("HQ", "corp", "salt");

            store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0, frequency)).unwrap();
            mirror.rebuild(&store, address, Level::Bit, Some(Particle::Proton)).unwrap();

            let records = mirror.read_all(address, Level::Bit, Some(Particle::Proton));
            prop_assert_eq!(records.len(), 1);
            prop_assert_eq!(records[0].bounce_rate, BounceRate::Infinite);
        }
    }
}
