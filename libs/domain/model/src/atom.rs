// [libs/domain/model/src/atom.rs]
//! The atom record (spec §3) and the bounce-rate law (spec §3 I3, §8 P5).
//!
//! Resolution of the BIT/higher-level particle ambiguity (see DESIGN.md):
//! only `Level::Bit` atoms carry a concrete `Particle`. From `Level::Byte`
//! upward a bonded atom aggregates constituents across all three channels
//! (matches §8 scenario 2: one BYTE atom from 24 mixed-channel BIT atoms)
//! and `particle` is `None`.

use crate::hashing::Hash32;
use crate::level::Level;
use crate::particle::Particle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `bounceRate(a) = 1000 / a.frequency` when `frequency > 0`, else a
/// distinguishable sentinel (spec §3 I3). Kept as its own type rather than
/// a bare `f64` so the `+infinity` sentinel can't silently be confused
/// with a very large but finite rate, and so JSON serialization (which
/// cannot represent `f64::INFINITY`) stays well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum BounceRate {
    Finite(f64),
    Infinite,
}

impl BounceRate {
    pub fn from_frequency(frequency: f64) -> Self {
        if frequency > 0.0 {
            BounceRate::Finite(round2(1000.0 / frequency))
        } else {
            BounceRate::Infinite
        }
    }
}

/// Rounds to 2 decimal places, matching the canonical fixed-decimal wire
/// format for frequency and bounce-rate (spec §6).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean of constituent frequencies, rounded to 2 decimals
/// (spec §3 I5, §8 P4). Flattens across particle channels when bonding
/// `Bit -> Byte`; for higher levels the single source log already holds
/// the flattened sequence.
pub fn mean_frequency(constituents: &[f64]) -> f64 {
    debug_assert!(!constituents.is_empty());
    let sum: f64 = constituents.iter().sum();
    round2(sum / constituents.len() as f64)
}

/// A reference to one constituent atom consumed by a bond, recorded on the
/// higher-level atom instead of a payload (spec §3: "higher levels carry
/// references to their constituents, not payload").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstituentRef {
    pub level: Level,
    pub particle: Option<Particle>,
    pub index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    pub level: Level,
    pub index: u64,
    pub particle: Option<Particle>,
    pub frequency: f64,
    pub timestamp: DateTime<Utc>,
    pub token_id: Uuid,

    /// Populated only for `Level::Bit` atoms.
    pub iv: Option<Vec<u8>>,
    pub auth_tag: Option<Vec<u8>>,
    pub encrypted_payload: Option<Vec<u8>>,

    /// Populated only above `Level::Bit`: the constituents this atom bonds.
    pub constituents: Vec<ConstituentRef>,

    pub hash: Hash32,
}

impl Atom {
    pub fn bounce_rate(&self) -> BounceRate {
        BounceRate::from_frequency(self.frequency)
    }

    pub fn is_bit(&self) -> bool {
        self.level == Level::Bit
    }
}
