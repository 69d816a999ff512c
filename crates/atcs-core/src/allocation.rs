//! Green-time allocation and the plan handed to the signal controller

use serde::{Deserialize, Serialize};

use crate::constants::LANE_COUNT;
use crate::Lane;

/// Green seconds per lane, in [`Lane::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneAllocation([u32; LANE_COUNT]);

impl LaneAllocation {
    pub fn new(green_times: [u32; LANE_COUNT]) -> Self {
        Self(green_times)
    }

    /// Same green time on every lane
    pub fn uniform(seconds: u32) -> Self {
        Self([seconds; LANE_COUNT])
    }

    pub fn green_times(&self) -> &[u32; LANE_COUNT] {
        &self.0
    }

    pub fn get(&self, lane: Lane) -> u32 {
        self.0[lane.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl From<[u32; LANE_COUNT]> for LaneAllocation {
    fn from(green_times: [u32; LANE_COUNT]) -> Self {
        Self(green_times)
    }
}

/// Result of one allocation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPlan {
    pub green_times: LaneAllocation,
    /// Green seconds distributed this cycle
    pub cycle_budget: u32,
    /// Per-lane clearance interval added after each green phase
    pub yellow_time: u32,
    /// True when the plan is the safe fallback rather than a live calculation
    pub used_fallback: bool,
}

impl TimingPlan {
    /// Full cycle length including yellow clearance on every lane
    pub fn total_cycle_time(&self) -> u32 {
        (LANE_COUNT as u32)
            .saturating_mul(self.yellow_time)
            .saturating_add(self.cycle_budget)
    }
}
