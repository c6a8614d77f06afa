// [libs/infra/ledger/src/store.rs]
//! `LedgerStore`: the sole writer of on-disk ATOMIC state (spec §3, §4.1).

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use atomic_domain_model::{hashing::chain_hash, zero_hash, Address, Atom, Hash32, Level, Particle};
use tracing::{error, warn};

use crate::errors::LedgerError;
use crate::key::LogKey;
use crate::record::{atom_from_body, canonical_body_bytes, frame_record, parse_records};

/// Cached view of one log, rebuilt from disk on first touch so repeated
/// appends don't re-parse the whole file every time.
struct LogState {
    last_hash: Hash32,
    count: u64,
    consumed: u64,
}

/// Rolling window size for the `append` latency sample used by
/// `write_latency_p99` (spec §5's backpressure signal). Small enough that
/// a burst of slow writes moves the percentile within one poll interval.
const LATENCY_WINDOW: usize = 256;

pub struct LedgerStore {
    root: PathBuf,
    states: Mutex<HashMap<LogKey, Arc<Mutex<LogState>>>>,
    append_latencies_ms: Mutex<VecDeque<f64>>,
}

impl LedgerStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            states: Mutex::new(HashMap::new()),
            append_latencies_ms: Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW)),
        }
    }

    fn record_append_latency(&self, elapsed_ms: f64) {
        let mut latencies = self.append_latencies_ms.lock().expect("latency window lock poisoned");
        if latencies.len() == LATENCY_WINDOW {
            latencies.pop_front();
        }
        latencies.push_back(elapsed_ms);
    }

    /// p99 append latency over the last `LATENCY_WINDOW` writes, in
    /// milliseconds (spec §5, "Backpressure signal"). `0.0` once no
    /// append has happened yet, which callers read as "no backpressure".
    pub fn write_latency_p99(&self) -> f64 {
        let latencies = self.append_latencies_ms.lock().expect("latency window lock poisoned");
        if latencies.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = latencies.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("latency samples are never NaN"));
        let rank = ((sorted.len() as f64) * 0.99).ceil() as usize;
        let index = rank.saturating_sub(1).min(sorted.len() - 1);
        sorted[index]
    }

    fn state_for(&self, key: LogKey) -> Result<Arc<Mutex<LogState>>, LedgerError> {
        let mut states = self.states.lock().expect("ledger store registry lock poisoned");
        if let Some(existing) = states.get(&key) {
            return Ok(existing.clone());
        }
        let loaded = self.load_state(key)?;
        let handle = Arc::new(Mutex::new(loaded));
        states.insert(key, handle.clone());
        Ok(handle)
    }

    fn load_state(&self, key: LogKey) -> Result<LogState, LedgerError> {
        let log_path = key.log_path(&self.root);
        let mut last_hash = zero_hash();
        let mut count = 0u64;

        if log_path.exists() {
            let buffer = fs::read(&log_path).map_err(|source| LedgerError::Io { log: key, source })?;
            let records = parse_records(&buffer);
            count = records.len() as u64;
            if let Some((_, hash)) = records.last() {
                last_hash = *hash;
            }
        }

        let consumed = self.read_cursor(key)?;
        if consumed > count {
            return Err(LedgerError::Invariant {
                log: key,
                reason: format!("cursor {consumed} exceeds appended count {count}"),
            });
        }
        Ok(LogState { last_hash, count, consumed })
    }

    fn read_cursor(&self, key: LogKey) -> Result<u64, LedgerError> {
        let cursor_path = key.cursor_path(&self.root);
        if !cursor_path.exists() {
            return Ok(0);
        }
        let contents = fs::read_to_string(&cursor_path).map_err(|source| LedgerError::Io { log: key, source })?;
        contents
            .trim()
            .parse()
            .map_err(|_| LedgerError::Invariant { log: key, reason: "cursor file is not a valid u64".into() })
    }

    fn write_cursor(&self, key: LogKey, consumed: u64) -> Result<(), LedgerError> {
        atomic_write(&key.cursor_path(&self.root), consumed.to_string().as_bytes())
            .map_err(|source| LedgerError::Io { log: key, source })
    }

    fn is_quarantined(&self, key: LogKey) -> bool {
        key.quarantine_path(&self.root).exists()
    }

    fn quarantine(&self, key: LogKey, reason: &str) {
        error!(log = %key, reason, "ledger log entering quarantine");
        let _ = atomic_write(&key.quarantine_path(&self.root), reason.as_bytes());
    }

    /// `append(address, level, particle, atom) -> entryHash` (spec §4.1).
    /// Assigns `atom.index` itself (the dense-prefix invariant P1 is the
    /// store's responsibility, not the caller's) and rewrites the whole
    /// log via temp-file-then-atomic-rename, the crash-safe strategy
    /// spec §4.1 names as an accepted alternative to journal-then-apply.
    pub fn append(&self, address: Address, level: Level, particle: Option<Particle>, mut atom: Atom) -> Result<Hash32, LedgerError> {
        let key = LogKey::new(address, level, particle);
        if self.is_quarantined(key) {
            return Err(LedgerError::Quarantined(key));
        }

        let state_handle = self.state_for(key)?;
        let mut state = state_handle.lock().expect("per-log state lock poisoned");

        atom.index = state.count;
        let body = canonical_body_bytes(&atom);
        let entry_hash = chain_hash(&state.last_hash, &body);

        let log_path = key.log_path(&self.root);
        let mut existing = if log_path.exists() {
            fs::read(&log_path).map_err(|source| LedgerError::Io { log: key, source })?
        } else {
            Vec::new()
        };
        existing.extend(frame_record(&body, entry_hash));

        let started = Instant::now();
        let write_result = atomic_write(&log_path, &existing);
        self.record_append_latency(started.elapsed().as_secs_f64() * 1000.0);
        if let Err(source) = write_result {
            return Err(LedgerError::Io { log: key, source });
        }

        state.last_hash = entry_hash;
        state.count += 1;
        Ok(entry_hash)
    }

    /// `readRange(address, level, particle, offset, count) -> []Atom`
    /// (spec §4.1). Readers are lock-free snapshots: this reads the file
    /// independently of any in-flight append's cached state.
    pub fn read_range(
        &self,
        address: Address,
        level: Level,
        particle: Option<Particle>,
        offset: u64,
        count: u64,
    ) -> Result<Vec<Atom>, LedgerError> {
        let key = LogKey::new(address, level, particle);
        let log_path = key.log_path(&self.root);
        if !log_path.exists() {
            return Ok(Vec::new());
        }

        let buffer = fs::read(&log_path).map_err(|source| LedgerError::Io { log: key, source })?;
        let records = parse_records(&buffer);

        let mut prev_hash = zero_hash();
        let mut atoms = Vec::new();
        for (index, (body, hash)) in records.iter().enumerate() {
            let expected = chain_hash(&prev_hash, body);
            if expected != *hash {
                self.quarantine(key, "hash chain break detected on read");
                return Err(LedgerError::Invariant { log: key, reason: "hash chain break".into() });
            }
            prev_hash = *hash;
            if (index as u64) >= offset && (index as u64) < offset.saturating_add(count) {
                atoms.push(atom_from_body(body, *hash)?);
            }
        }
        Ok(atoms)
    }

    /// `countAvailable(address, level, particle) -> uint64` (spec §4.1).
    pub fn count_available(&self, address: Address, level: Level, particle: Option<Particle>) -> Result<u64, LedgerError> {
        let key = LogKey::new(address, level, particle);
        let state_handle = self.state_for(key)?;
        let state = state_handle.lock().expect("per-log state lock poisoned");
        Ok(state.count - state.consumed)
    }

    /// The log's current consumed cursor, i.e. the index of the first
    /// not-yet-consumed atom. Used by the Bonding Engine to read "the
    /// first FANIN atoms" (spec §4.7 step 1) relative to what earlier
    /// bonds have already consumed.
    pub fn consumed_count(&self, address: Address, level: Level, particle: Option<Particle>) -> Result<u64, LedgerError> {
        let key = LogKey::new(address, level, particle);
        let state_handle = self.state_for(key)?;
        let state = state_handle.lock().expect("per-log state lock poisoned");
        Ok(state.consumed)
    }

    /// `markConsumed(address, level, particle, count)` (spec §4.1).
    /// `count` is the new absolute cursor value: idempotent when it does
    /// not exceed the current cursor, rejected when it exceeds the
    /// number of atoms actually appended.
    pub fn mark_consumed(&self, address: Address, level: Level, particle: Option<Particle>, count: u64) -> Result<(), LedgerError> {
        let key = LogKey::new(address, level, particle);
        let state_handle = self.state_for(key)?;
        let mut state = state_handle.lock().expect("per-log state lock poisoned");

        if count <= state.consumed {
            warn!(log = %key, count, consumed = state.consumed, "markConsumed called with a non-advancing cursor, ignored");
            return Ok(());
        }
        if count > state.count {
            return Err(LedgerError::Invariant {
                log: key,
                reason: format!("markConsumed({count}) exceeds appended count {}", state.count),
            });
        }

        state.consumed = count;
        self.write_cursor(key, count)
    }
}

/// Write-to-temp, fsync, atomic rename (spec §4.1's crash-safety contract).
pub(crate) fn atomic_write(path: &std::path::Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut temp_path = path.as_os_str().to_os_string();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);
    {
        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(contents)?;
        temp_file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_domain_model::ConstituentRef;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn sample_address() -> Address {
        Address::derive("HQ", "corp", "salt")
    }

    fn sample_atom(index: u64) -> Atom {
        Atom {
            level: Level::Bit,
            index,
            particle: Some(Particle::Proton),
            frequency: 500.0,
            timestamp: Utc::now(),
            token_id: Uuid::nil(),
            iv: None,
            auth_tag: None,
            encrypted_payload: Some(vec![1]),
            constituents: Vec::<ConstituentRef>::new(),
            hash: zero_hash(),
        }
    }

    #[test]
    fn appended_atoms_get_dense_indices() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let address = sample_address();

        store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
        store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();

        let atoms = store.read_range(address, Level::Bit, Some(Particle::Proton), 0, 10).unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].index, 0);
        assert_eq!(atoms[1].index, 1);
    }

    #[test]
    fn chain_hash_links_first_entry_to_zero_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let address = sample_address();
        let entry_hash = store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
        let atoms = store.read_range(address, Level::Bit, Some(Particle::Proton), 0, 1).unwrap();
        assert_eq!(atoms[0].hash, entry_hash);
    }

    #[test]
    fn count_available_reflects_unconsumed_atoms() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let address = sample_address();
        for _ in 0..8 {
            store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
        }
        assert_eq!(store.count_available(address, Level::Bit, Some(Particle::Proton)).unwrap(), 8);

        store.mark_consumed(address, Level::Bit, Some(Particle::Proton), 8).unwrap();
        assert_eq!(store.count_available(address, Level::Bit, Some(Particle::Proton)).unwrap(), 0);
    }

    #[test]
    fn mark_consumed_is_idempotent_on_non_advancing_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let address = sample_address();
        store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
        store.mark_consumed(address, Level::Bit, Some(Particle::Proton), 1).unwrap();
        assert!(store.mark_consumed(address, Level::Bit, Some(Particle::Proton), 0).is_ok());
        assert_eq!(store.count_available(address, Level::Bit, Some(Particle::Proton)).unwrap(), 0);
    }

    #[test]
    fn write_latency_p99_is_zero_before_any_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        assert_eq!(store.write_latency_p99(), 0.0);
    }

    #[test]
    fn write_latency_p99_reflects_recorded_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let address = sample_address();
        for i in 0..10 {
            store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(i)).unwrap();
        }
        assert!(store.write_latency_p99() >= 0.0);
    }

    #[test]
    fn mark_consumed_beyond_appended_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let address = sample_address();
        store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
        assert!(store.mark_consumed(address, Level::Bit, Some(Particle::Proton), 5).is_err());
    }

    proptest! {
        /// P1 (monotonic indices): for any number of sequential appends to
        /// one (address, level, particle), the stored atoms form a dense
        /// prefix `0..N-1`.
        #[test]
        fn p1_appended_indices_are_a_dense_prefix(n in 1usize..40) {
            let dir = tempfile::tempdir().unwrap();
            let store = LedgerStore::open(dir.path());
            let address = sample_address();
            for _ in 0..n {
                store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
            }
            let atoms = store.read_range(address, Level::Bit, Some(Particle::Proton), 0, n as u64).unwrap();
            let indices: Vec<u64> = atoms.iter().map(|a| a.index).collect();
            prop_assert_eq!(indices, (0..n as u64).collect::<Vec<u64>>());
        }

        /// P2 (hash chain): `read_range` re-derives every entry's hash from
        /// its predecessor and rejects the log on any break, so a log that
        /// reads back successfully for any append count necessarily has an
        /// intact chain rooted at the zero hash.
        #[test]
        fn p2_hash_chain_is_intact_after_any_number_of_appends(n in 1usize..40) {
            let dir = tempfile::tempdir().unwrap();
            let store = LedgerStore::open(dir.path());
            let address = sample_address();
            for _ in 0..n {
                store.append(address, Level::Bit, Some(Particle::Proton), sample_atom(0)).unwrap();
            }
            prop_assert!(store.read_range(address, Level::Bit, Some(Particle::Proton), 0, n as u64).is_ok());
        }
    }
}
