//! Cycle budget from aggregate demand

use atcs_core::constants::{DEMAND_THRESHOLD, SECONDS_PER_INCREMENT, VEHICLES_PER_INCREMENT};
use atcs_core::{EngineConfig, LaneDemand};

/// Total green seconds to distribute this cycle
///
/// A junction where no lane exceeds `min_time` vehicles runs the minimal
/// cycle (`4 * min_time`). Otherwise the base cycle grows by one increment for
/// every started block of [`VEHICLES_PER_INCREMENT`] vehicles above
/// [`DEMAND_THRESHOLD`], capped at `max_cycle_time`.
pub fn cycle_budget(demand: &LaneDemand, config: &EngineConfig) -> u32 {
    if demand.all_at_most(config.min_time) {
        return config.minimal_cycle();
    }

    let total = demand.total();
    if total <= DEMAND_THRESHOLD {
        return config.base_cycle_time;
    }

    // Ceiling division: 101 vehicles already earn the first increment.
    let increments = (total - DEMAND_THRESHOLD).div_ceil(VEHICLES_PER_INCREMENT);
    let extra = increments.saturating_mul(u64::from(SECONDS_PER_INCREMENT));
    let scaled = u64::from(config.base_cycle_time).saturating_add(extra);
    scaled.min(u64::from(config.max_cycle_time)) as u32
}
