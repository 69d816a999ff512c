//! Whole-second rounding that preserves the cycle budget

use atcs_core::constants::LANE_COUNT;
use atcs_core::{EngineConfig, Error, LaneAllocation, LaneDemand};
use tracing::debug;

use crate::allocator::Split;

/// Round each lane to the nearest second, then move single seconds until the
/// total equals `budget`
///
/// Seconds are added to the busiest lane furthest from its ceiling and taken
/// from the quietest, shortest lane still above its floor. Ties go to the
/// lowest lane index.
pub fn balance(
    demand: &LaneDemand,
    split: &Split,
    budget: u32,
    config: &EngineConfig,
) -> atcs_core::Result<LaneAllocation> {
    let mut seconds = [0u32; LANE_COUNT];
    for (out, &value) in seconds.iter_mut().zip(split.iter()) {
        *out = value.round().max(0.0) as u32;
    }

    let total: i64 = seconds.iter().map(|&s| i64::from(s)).sum();
    let diff = i64::from(budget) - total;
    let counts = demand.counts();

    for step in 0..diff.unsigned_abs() {
        let lane = if diff > 0 {
            lane_to_extend(counts, &seconds, config)
        } else {
            lane_to_trim(counts, &seconds, config)
        };
        let Some(lane) = lane else {
            let done = step as i64;
            return Err(Error::Unbalanced {
                remaining: if diff > 0 { diff - done } else { diff + done },
            });
        };
        if diff > 0 {
            seconds[lane] += 1;
        } else {
            seconds[lane] -= 1;
        }
    }

    if diff != 0 {
        debug!(diff, "Balanced rounding difference");
    }
    Ok(LaneAllocation::new(seconds))
}

fn lane_to_extend(counts: &[u32; LANE_COUNT], seconds: &[u32; LANE_COUNT], config: &EngineConfig) -> Option<usize> {
    let ceiling = f64::from(config.max_time);
    let mut best: Option<(usize, f64)> = None;
    for i in 0..LANE_COUNT {
        if seconds[i] >= config.max_time {
            continue;
        }
        let score = f64::from(counts[i]) * (1.0 - f64::from(seconds[i]) / ceiling);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

fn lane_to_trim(counts: &[u32; LANE_COUNT], seconds: &[u32; LANE_COUNT], config: &EngineConfig) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for i in 0..LANE_COUNT {
        if seconds[i] <= config.min_time {
            continue;
        }
        let score = u64::from(counts[i]) + u64::from(seconds[i]);
        if best.map_or(true, |(_, low)| score < low) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}
