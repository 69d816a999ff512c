//! Demand-proportional split of the cycle budget

use atcs_core::constants::LANE_COUNT;
use atcs_core::{EngineConfig, LaneDemand};
use tracing::debug;

/// Fractional green seconds per lane, before ceiling repair and rounding
pub type Split = [f64; LANE_COUNT];

/// Whether a lane's demand earns more than the floor
///
/// Lanes at or below `min_time` vehicles are fixed at `min_time` seconds.
pub fn is_adjustable(count: u32, config: &EngineConfig) -> bool {
    count > config.min_time
}

/// Give every lane `min_time`, then share what is left of the budget among
/// adjustable lanes in proportion to their demand
pub fn proportional_split(demand: &LaneDemand, budget: u32, config: &EngineConfig) -> Split {
    let floor = f64::from(config.min_time);
    let mut split = [floor; LANE_COUNT];

    let counts = demand.counts();
    let adjustable: Vec<usize> = (0..LANE_COUNT)
        .filter(|&i| is_adjustable(counts[i], config))
        .collect();
    if adjustable.is_empty() {
        return split;
    }

    let fixed = LANE_COUNT - adjustable.len();
    let committed = (fixed + adjustable.len()) as f64 * floor;
    let remaining = f64::from(budget) - committed;
    if remaining <= 0.0 {
        return split;
    }

    let adjustable_total: f64 = adjustable.iter().map(|&i| f64::from(counts[i])).sum();
    for &i in &adjustable {
        let share = remaining * f64::from(counts[i]) / adjustable_total;
        split[i] = floor + share;
        debug!(lane = i + 1, vehicles = counts[i], seconds = split[i], "Proportional share");
    }

    split
}
