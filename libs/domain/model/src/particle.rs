// [libs/domain/model/src/particle.rs]
//! The three parallel particle channels every level's ledger is split into.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Particle {
    Proton,
    Neutron,
    Electron,
}

impl Particle {
    pub const ALL: [Particle; 3] = [Particle::Proton, Particle::Neutron, Particle::Electron];

    /// Deterministic `bit-position -> particle` assignment used by the
    /// Bit Sharder (spec §4.5 step 4): `["proton","neutron","electron"][i % 3]`.
    pub fn for_bit_index(index: u64) -> Particle {
        Self::ALL[(index % 3) as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Particle::Proton => "proton",
            Particle::Neutron => "neutron",
            Particle::Electron => "electron",
        }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Particle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "proton" => Ok(Particle::Proton),
            "neutron" => Ok(Particle::Neutron),
            "electron" => Ok(Particle::Electron),
            other => Err(format!("unrecognized particle channel: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_index_cycles_proton_neutron_electron() {
        assert_eq!(Particle::for_bit_index(0), Particle::Proton);
        assert_eq!(Particle::for_bit_index(1), Particle::Neutron);
        assert_eq!(Particle::for_bit_index(2), Particle::Electron);
        assert_eq!(Particle::for_bit_index(3), Particle::Proton);
    }
}
