//! Vehicle-count snapshot for one allocation request

use serde::{Deserialize, Serialize};

use crate::constants::LANE_COUNT;
use crate::{Error, Lane};

/// Validated vehicle counts, one per lane, in [`Lane::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneDemand([u32; LANE_COUNT]);

impl LaneDemand {
    pub fn new(counts: [u32; LANE_COUNT]) -> Self {
        Self(counts)
    }

    /// Validate raw counts from a demand source
    ///
    /// Rejects anything that is not exactly four non-negative values.
    pub fn from_counts(counts: &[i64]) -> crate::Result<Self> {
        if counts.len() != LANE_COUNT {
            return Err(Error::InvalidLaneCount {
                expected: LANE_COUNT,
                actual: counts.len(),
            });
        }

        let mut out = [0u32; LANE_COUNT];
        for (lane, (&value, slot)) in counts.iter().zip(out.iter_mut()).enumerate() {
            if value < 0 {
                return Err(Error::NegativeDemand { lane, value });
            }
            *slot = u32::try_from(value).unwrap_or(u32::MAX);
        }
        Ok(Self(out))
    }

    pub fn counts(&self) -> &[u32; LANE_COUNT] {
        &self.0
    }

    pub fn get(&self, lane: Lane) -> u32 {
        self.0[lane.index()]
    }

    /// Total vehicles across all lanes
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }

    /// True when every lane is at or below `threshold`
    pub fn all_at_most(&self, threshold: u32) -> bool {
        self.0.iter().all(|&c| c <= threshold)
    }
}

impl From<[u32; LANE_COUNT]> for LaneDemand {
    fn from(counts: [u32; LANE_COUNT]) -> Self {
        Self(counts)
    }
}

impl TryFrom<&[i64]> for LaneDemand {
    type Error = Error;

    fn try_from(counts: &[i64]) -> Result<Self, Self::Error> {
        Self::from_counts(counts)
    }
}
