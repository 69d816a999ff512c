//! Ceiling repair: cap lanes at `max_time` and hand the excess to the rest
//!
//! Redistribution runs for at most [`MAX_REPAIR_ITERATIONS`] rounds. Time
//! that no lane can absorb is removed from the cycle budget instead, so the
//! ceiling always holds.

use atcs_core::constants::{LANE_COUNT, MAX_REPAIR_ITERATIONS};
use atcs_core::{EngineConfig, LaneDemand};
use tracing::debug;

use crate::allocator::{is_adjustable, Split};

/// Outcome of a ceiling repair pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CeilingRepair {
    /// Budget the rounding stage must hit
    pub budget: u32,
    /// Redistribution rounds that moved time
    pub rounds: usize,
    /// Seconds removed from the original budget
    pub shrunk_by: u32,
}

/// Cap every lane at `max_time`, redistributing the excess in place
pub fn enforce_ceiling(
    demand: &LaneDemand,
    split: &mut Split,
    budget: u32,
    config: &EngineConfig,
) -> CeilingRepair {
    let ceiling = f64::from(config.max_time);
    let counts = demand.counts();

    // Overflow clamped off receivers in the previous round.
    let mut carried = 0.0;
    let mut unplaced = 0.0;
    let mut rounds = 0;

    loop {
        let mut excess = carried;
        carried = 0.0;
        for seconds in split.iter_mut() {
            if *seconds > ceiling {
                excess += *seconds - ceiling;
                *seconds = ceiling;
            }
        }
        if excess <= 0.0 {
            break;
        }
        if rounds == MAX_REPAIR_ITERATIONS {
            unplaced += excess;
            break;
        }

        let under: Vec<usize> = (0..LANE_COUNT).filter(|&i| split[i] < ceiling).collect();
        if under.is_empty() {
            unplaced += excess;
            break;
        }

        let eligible: Vec<usize> = under
            .iter()
            .copied()
            .filter(|&i| is_adjustable(counts[i], config))
            .collect();

        if eligible.is_empty() {
            let share = excess / under.len() as f64;
            for &i in &under {
                carried += receive(&mut split[i], share, ceiling);
            }
        } else {
            let weight: f64 = eligible.iter().map(|&i| f64::from(counts[i])).sum();
            for &i in &eligible {
                let share = excess * f64::from(counts[i]) / weight;
                carried += receive(&mut split[i], share, ceiling);
            }
        }

        debug!(round = rounds, excess, receivers = under.len(), "Redistributed excess green time");
        rounds += 1;
    }

    let shrunk_by = unplaced.round() as u32;
    let budget = budget
        .saturating_sub(shrunk_by)
        .clamp(config.minimal_cycle(), config.saturated_cycle());
    if shrunk_by > 0 {
        debug!(shrunk_by, budget, "Reduced cycle budget to respect max green time");
    }

    CeilingRepair {
        budget,
        rounds,
        shrunk_by,
    }
}

/// Add `share` to a lane, returning whatever overflowed the ceiling
fn receive(seconds: &mut f64, share: f64, ceiling: f64) -> f64 {
    let raised = *seconds + share;
    if raised > ceiling {
        *seconds = ceiling;
        raised - ceiling
    } else {
        *seconds = raised;
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::proportional_split;

    fn repair(counts: [u32; 4], budget: u32, config: &EngineConfig) -> (Split, CeilingRepair) {
        let demand = LaneDemand::new(counts);
        let mut split = proportional_split(&demand, budget, config);
        let outcome = enforce_ceiling(&demand, &mut split, budget, config);
        (split, outcome)
    }

    fn total(split: &Split) -> f64 {
        split.iter().sum()
    }

    #[test]
    fn test_no_excess_is_untouched() {
        let config = EngineConfig::default();
        let (split, outcome) = repair([25, 25, 25, 25], 120, &config);
        assert_eq!(split, [30.0; 4]);
        assert_eq!(outcome, CeilingRepair { budget: 120, rounds: 0, shrunk_by: 0 });
    }

    #[test]
    fn test_excess_goes_to_adjustable_lanes_by_demand() {
        let config = EngineConfig::default();
        // Lane 0 would get 15 + 120 * 150/170 ≈ 120.9 before the cap.
        let (split, outcome) = repair([150, 20, 10, 10], 180, &config);
        assert_eq!(split[0], 90.0);
        assert_eq!(split[2], 15.0);
        assert_eq!(split[3], 15.0);
        assert!((split[1] - 60.0).abs() < 1e-9);
        assert_eq!(outcome.budget, 180);
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn test_fixed_lanes_share_evenly_when_nobody_else_can() {
        let config = EngineConfig::default();
        let (split, outcome) = repair([100, 5, 5, 5], 140, &config);
        assert_eq!(split[0], 90.0);
        for seconds in &split[1..] {
            assert!((seconds - (15.0 + 5.0 / 3.0)).abs() < 1e-9);
        }
        assert!((total(&split) - 140.0).abs() < 1e-9);
        assert_eq!(outcome.shrunk_by, 0);
    }

    #[test]
    fn test_overflowing_receiver_passes_excess_on() {
        let config = EngineConfig::new(10, 40, 120, 160);
        // Budget 160: lanes 0 and 1 both overflow, lane 2 absorbs the rest.
        let (split, outcome) = repair([200, 120, 60, 5], 160, &config);
        assert!(split.iter().all(|&s| s <= 40.0));
        assert!((total(&split) - 160.0).abs() < 1e-9);
        assert!(outcome.rounds >= 2);
        assert_eq!(outcome.budget, 160);
    }

    #[test]
    fn test_budget_shrinks_when_ceiling_cannot_absorb() {
        let config = EngineConfig::new(15, 25, 120, 180);
        let (split, outcome) = repair([50, 50, 50, 50], 180, &config);
        assert_eq!(split, [25.0; 4]);
        assert_eq!(outcome.budget, 100);
        assert_eq!(outcome.shrunk_by, 80);
    }
}
