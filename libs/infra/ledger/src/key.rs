// [libs/infra/ledger/src/key.rs]
//! Identifies one on-disk log: `ledger/<address>/<level>/<particle>.log`
//! (spec §6). Levels above `Bit` aggregate all three particle channels
//! into a single combined log (see `atomic_domain_model::atom`'s
//! resolution note); `particle` is `None` there and the path segment
//! is `combined`.

use atomic_domain_model::{Address, Level, Particle};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogKey {
    pub address: Address,
    pub level: Level,
    pub particle: Option<Particle>,
}

impl LogKey {
    pub fn new(address: Address, level: Level, particle: Option<Particle>) -> Self {
        Self { address, level, particle }
    }

    fn particle_segment(&self) -> String {
        self.particle.map(|p| p.as_str().to_string()).unwrap_or_else(|| "combined".to_string())
    }

    pub fn directory(&self, root: &std::path::Path) -> PathBuf {
        root.join(self.address.as_path_component()).join(self.level.as_str())
    }

    pub fn log_path(&self, root: &std::path::Path) -> PathBuf {
        self.directory(root).join(format!("{}.log", self.particle_segment()))
    }

    pub fn cursor_path(&self, root: &std::path::Path) -> PathBuf {
        self.directory(root).join(format!("{}.cursor", self.particle_segment()))
    }

    pub fn quarantine_path(&self, root: &std::path::Path) -> PathBuf {
        self.directory(root).join(format!("{}.quarantine", self.particle_segment()))
    }
}

impl fmt::Display for LogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.address.to_hex(), self.level, self.particle_segment())
    }
}
