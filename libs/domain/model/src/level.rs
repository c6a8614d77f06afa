// [libs/domain/model/src/level.rs]
//! The six-rung atom hierarchy and its fan-in constants (spec §3, §4.7).

use serde::{Deserialize, Serialize};
use std::fmt;

/// An atom's rung in the bonding hierarchy, ordered `Bit < Byte < Kb < Mb < Gb < Tb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Bit,
    Byte,
    Kb,
    Mb,
    Gb,
    Tb,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Bit,
        Level::Byte,
        Level::Kb,
        Level::Mb,
        Level::Gb,
        Level::Tb,
    ];

    /// The level immediately below this one, or `None` for `Bit`.
    pub fn predecessor(self) -> Option<Level> {
        match self {
            Level::Bit => None,
            Level::Byte => Some(Level::Bit),
            Level::Kb => Some(Level::Byte),
            Level::Mb => Some(Level::Kb),
            Level::Gb => Some(Level::Mb),
            Level::Tb => Some(Level::Gb),
        }
    }

    /// The level immediately above this one, or `None` for `Tb`.
    pub fn successor(self) -> Option<Level> {
        match self {
            Level::Bit => Some(Level::Byte),
            Level::Byte => Some(Level::Kb),
            Level::Kb => Some(Level::Mb),
            Level::Mb => Some(Level::Gb),
            Level::Gb => Some(Level::Tb),
            Level::Tb => None,
        }
    }

    /// The number of same-particle, same-level atoms a bond at this level
    /// consumes from `self.predecessor()`. Authoritative per spec §9's open
    /// question: `Bit -> Byte` is 8 (the byte boundary), every other rung is
    /// 1024. A level with no predecessor (`Bit`) has no fan-in.
    pub fn fanin(self) -> Option<u32> {
        match self {
            Level::Bit => None,
            Level::Byte => Some(8),
            Level::Kb | Level::Mb | Level::Gb | Level::Tb => Some(1024),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Bit => "BIT",
            Level::Byte => "BYTE",
            Level::Kb => "KB",
            Level::Mb => "MB",
            Level::Gb => "GB",
            Level::Tb => "TB",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BIT" => Ok(Level::Bit),
            "BYTE" => Ok(Level::Byte),
            "KB" => Ok(Level::Kb),
            "MB" => Ok(Level::Mb),
            "GB" => Ok(Level::Gb),
            "TB" => Ok(Level::Tb),
            other => Err(format!("unrecognized atom level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_to_byte_fanin_is_eight() {
        assert_eq!(Level::Byte.fanin(), Some(8));
    }

    #[test]
    fn higher_levels_fanin_is_1024() {
        for level in [Level::Kb, Level::Mb, Level::Gb, Level::Tb] {
            assert_eq!(level.fanin(), Some(1024));
        }
    }

    #[test]
    fn ordering_matches_hierarchy() {
        assert!(Level::Bit < Level::Byte);
        assert!(Level::Byte < Level::Kb);
        assert!(Level::Gb < Level::Tb);
    }

    #[test]
    fn round_trip_through_string() {
        for level in Level::ALL {
            let parsed: Level = level.as_str().parse().unwrap();
            assert_eq!(parsed, level);
        }
    }
}
