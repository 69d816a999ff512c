//! Lane identifier for a four-way junction

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four fixed approaches to a junction
///
/// Demand and allocation arrays are always indexed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    North,
    South,
    East,
    West,
}

impl Lane {
    /// All lanes in array order
    pub const ALL: [Lane; 4] = [Lane::North, Lane::South, Lane::East, Lane::West];

    /// Position of this lane in demand/allocation arrays
    pub fn index(&self) -> usize {
        match self {
            Lane::North => 0,
            Lane::South => 1,
            Lane::East => 2,
            Lane::West => 3,
        }
    }

    /// Lane at a given array position
    pub fn from_index(index: usize) -> Option<Lane> {
        Self::ALL.get(index).copied()
    }

    /// 1-based lane number used by detection hardware
    pub fn number(&self) -> u8 {
        self.index() as u8 + 1
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::North => write!(f, "north"),
            Lane::South => write!(f, "south"),
            Lane::East => write!(f, "east"),
            Lane::West => write!(f, "west"),
        }
    }
}
