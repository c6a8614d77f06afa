// [libs/domain/bonding/src/bonder.rs]
//! One `Bonder` per (level L, address) (spec §4.7).

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use atomic_domain_model::{atom::mean_frequency, Address, Atom, ConstituentRef, Level, Particle};
use atomic_domain_token_registry::TokenRegistry;
use atomic_infra_ledger::LedgerStore;
use tracing::{error, info, warn};

use crate::errors::BondingError;
use crate::validator::validate_constituents;

/// Spec §5 backpressure threshold: above this p99 append latency the
/// Bonding Engine slows new bond attempts instead of refusing them
/// outright, since a bond is a consumer of already-appended atoms, not
/// a new write request.
const BACKPRESSURE_THRESHOLD_MS: f64 = 250.0;
const BACKPRESSURE_SLOWDOWN: Duration = Duration::from_millis(50);

/// `IDLE -> WAITING -> BONDING -> IDLE` on success; `BONDING ->
/// BONDQUARANTINE` on append failure; terminal only on operator clear
/// (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonderState {
    Idle,
    Waiting,
    Bonding,
    BondQuarantine,
}

#[derive(Debug, Clone)]
pub enum BondOutcome {
    /// Spec §7 `InsufficientAtoms`: not an error, a normal waiting state.
    InsufficientAtoms,
    Bonded(Atom),
}

pub struct Bonder {
    address: Address,
    level: Level,
    state: Mutex<BonderState>,
}

/// The particle channels a bond at `level` reads from `level.predecessor()`.
/// Only `Byte`'s predecessor (`Bit`) still has three distinct channels;
/// every level above aggregates into the single combined log (see
/// `atomic_domain_model::atom`'s resolution note).
fn channels_for(level: Level) -> Vec<Option<Particle>> {
    if level == Level::Byte {
        Particle::ALL.iter().map(|p| Some(*p)).collect()
    } else {
        vec![None]
    }
}

impl Bonder {
    pub fn new(address: Address, level: Level) -> Self {
        Self { address, level, state: Mutex::new(BonderState::Idle) }
    }

    pub fn state(&self) -> BonderState {
        *self.state.lock().expect("bonder state lock poisoned")
    }

    /// Attempts one bond pass. Returns `InsufficientAtoms` when the
    /// trigger rule (spec §4.7) isn't yet met, rather than an error.
    pub fn try_bond(&self, store: &LedgerStore, registry: &TokenRegistry) -> Result<BondOutcome, BondingError> {
        if *self.state.lock().expect("bonder state lock poisoned") == BonderState::BondQuarantine {
            return Err(BondingError::Quarantine("bonder is quarantined, awaiting operator replay".into()));
        }

        let p99_ms = store.write_latency_p99();
        if p99_ms > BACKPRESSURE_THRESHOLD_MS {
            warn!(address = %self.address, level = %self.level, p99_ms, "ledger under backpressure, slowing bond attempt");
            thread::sleep(BACKPRESSURE_SLOWDOWN);
        }

        let Some(predecessor) = self.level.predecessor() else {
            return Ok(BondOutcome::InsufficientAtoms);
        };
        let fanin = self.level.fanin().expect("non-Bit level always has a fanin");
        let channels = channels_for(self.level);

        for channel in &channels {
            if store.count_available(self.address, predecessor, *channel)? < fanin as u64 {
                return Ok(BondOutcome::InsufficientAtoms);
            }
        }

        *self.state.lock().expect("bonder state lock poisoned") = BonderState::Bonding;

        let mut all_constituents: Vec<Atom> = Vec::new();
        for channel in &channels {
            let offset = store.consumed_count(self.address, predecessor, *channel)?;
            let batch = store.read_range(self.address, predecessor, *channel, offset, fanin as u64)?;
            if let Err(reason) = validate_constituents(&batch, fanin, registry) {
                *self.state.lock().expect("bonder state lock poisoned") = BonderState::Idle;
                warn!(address = %self.address, level = %self.level, reason, "bond validator rejected batch");
                return Err(BondingError::ValidatorRejected(reason));
            }
            all_constituents.extend(batch);
        }

        let frequencies: Vec<f64> = all_constituents.iter().map(|a| a.frequency).collect();
        let frequency = mean_frequency(&frequencies);
        let first = &all_constituents[0];

        let refs: Vec<ConstituentRef> = all_constituents
            .iter()
            .map(|a| ConstituentRef { level: a.level, particle: a.particle, index: a.index })
            .collect();

        let bonded = Atom {
            level: self.level,
            index: 0, // assigned by the ledger store on append
            particle: None,
            frequency,
            timestamp: first.timestamp,
            token_id: first.token_id,
            iv: None,
            auth_tag: None,
            encrypted_payload: None,
            constituents: refs,
            hash: atomic_domain_model::zero_hash(),
        };

        match store.append(self.address, self.level, None, bonded.clone()) {
            Ok(entry_hash) => {
                for channel in &channels {
                    let offset = store.consumed_count(self.address, predecessor, *channel)?;
                    store.mark_consumed(self.address, predecessor, *channel, offset + fanin as u64)?;
                }
                *self.state.lock().expect("bonder state lock poisoned") = BonderState::Idle;
                let mut finalized = bonded;
                finalized.hash = entry_hash;
                info!(address = %self.address, level = %self.level, "bond completed");
                Ok(BondOutcome::Bonded(finalized))
            }
            Err(e) => {
                *self.state.lock().expect("bonder state lock poisoned") = BonderState::BondQuarantine;
                error!(address = %self.address, level = %self.level, error = %e, "bond append failed, entering quarantine");
                Err(BondingError::Quarantine(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_core_crypto::{SignatureBackend, Signer};
    use atomic_core_pricing::TokenPriceQuote;
    use atomic_domain_model::atom::round2;
    use atomic_domain_model::zero_hash;
    use atomic_domain_token_registry::NodeIdentity;
    use chrono::Utc;
    use proptest::prelude::*;

    fn sample_registry_with_active_token() -> (TokenRegistry, uuid::Uuid) {
        let registry = TokenRegistry::new(NodeIdentity::new("S-1"), Signer::generate(SignatureBackend::Legacy).unwrap());
        let quote = TokenPriceQuote { base_node_price: 9.75, effective_node_price: 9.75, base_token_price: 9.75, adjusted_token_price: 9.75 };
        let (token, _) = registry.mint("HQ", &quote).unwrap();
        (registry, token.token_id)
    }

    fn bit_atom(token_id: uuid::Uuid, particle: Particle, index: u64) -> Atom {
        bit_atom_with_frequency(token_id, particle, index, 500.0)
    }

    fn bit_atom_with_frequency(token_id: uuid::Uuid, particle: Particle, index: u64, frequency: f64) -> Atom {
        Atom {
            level: Level::Bit,
            index,
            particle: Some(particle),
            frequency,
            timestamp: Utc::now(),
            token_id,
            iv: None,
            auth_tag: None,
            encrypted_payload: Some(vec![1]),
            constituents: Vec::new(),
            hash: zero_hash(),
        }
    }

    #[test]
    fn insufficient_atoms_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let (registry, _) = sample_registry_with_active_token();
        let address = Address::derive("HQ", "corp", "salt");
        let bonder = Bonder::new(address, Level::Byte);

        let outcome = bonder.try_bond(&store, &registry).unwrap();
        assert!(matches!(outcome, BondOutcome::InsufficientAtoms));
    }

    #[test]
    fn bit_to_byte_bond_consumes_eight_per_channel() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path());
        let (registry, token_id) = sample_registry_with_active_token();
        let address = Address::derive("HQ", "corp", "salt");

        for particle in Particle::ALL {
            for i in 0..8u64 {
                store.append(address, Level::Bit, Some(particle), bit_atom(token_id, particle, i)).unwrap();
            }
        }

        let bonder = Bonder::new(address, Level::Byte);
        let outcome = bonder.try_bond(&store, &registry).unwrap();
        let BondOutcome::Bonded(atom) = outcome else { panic!("expected a bond") };
        assert_eq!(atom.constituents.len(), 24);
        assert_eq!(atom.frequency, 500.0);

        for particle in Particle::ALL {
            assert_eq!(store.count_available(address, Level::Bit, Some(particle)).unwrap(), 0);
        }
        assert_eq!(bonder.state(), BonderState::Idle);
    }

    proptest! {
        /// P3 (consumption matches bonding) and P4 (frequency mean): for
        /// any 24 constituent frequencies (8 per particle channel), a
        /// `Bit -> Byte` bond consumes exactly 8 atoms per channel and the
        /// bonded atom's frequency is `round2(mean(all 24))`.
        #[test]
        fn p3_p4_bit_to_byte_bond_matches_fanin_and_mean(frequencies in prop::collection::vec(1.0f64..999.0, 24)) {
            let dir = tempfile::tempdir().unwrap();
            let store = LedgerStore::open(dir.path());
            let (registry, token_id) = sample_registry_with_active_token();
            let address = Address::derive("HQ", "corp", "salt");

            for (channel, particle) in Particle::ALL.iter().enumerate() {
                for i in 0..8u64 {
                    let frequency = frequencies[channel * 8 + i as usize];
                    store.append(address, Level::Bit, Some(*particle), bit_atom_with_frequency(token_id, *particle, i, frequency)).unwrap();
                }
            }

            let bonder = Bonder::new(address, Level::Byte);
            let outcome = bonder.try_bond(&store, &registry).unwrap();
            let BondOutcome::Bonded(atom) = outcome else { panic!("expected a bond") };

            prop_assert_eq!(atom.frequency, round2(frequencies.iter().sum::<f64>() / frequencies.len() as f64));
            for particle in Particle::ALL {
                prop_assert_eq!(store.consumed_count(address, Level::Bit, Some(particle)).unwrap(), 8);
                prop_assert_eq!(store.count_available(address, Level::Bit, Some(particle)).unwrap(), 0);
            }
        }
    }
}
