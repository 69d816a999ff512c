//! Independent re-check of a plan against the timing invariants

use atcs_core::constants::{LANE_COUNT, ORDER_TOLERANCE};
use atcs_core::{EngineConfig, Lane, LaneAllocation, LaneDemand};
use thiserror::Error;
use tracing::{debug, warn};

/// First invariant a plan breaks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{lane} lane has {seconds}s, outside [{min}, {max}]")]
    OutOfBounds {
        lane: Lane,
        seconds: u32,
        min: u32,
        max: u32,
    },

    #[error("green times sum to {total}s but cycle budget is {budget}s")]
    BudgetMismatch { total: u32, budget: u32 },

    #[error("{busier} lane ({busier_seconds}s) trails quieter {quieter} lane ({quieter_seconds}s) by more than {tolerance}s")]
    OrderInversion {
        busier: Lane,
        busier_seconds: u32,
        quieter: Lane,
        quieter_seconds: u32,
        tolerance: u32,
    },
}

/// Check bounds, budget conservation and demand ordering
pub fn check(
    config: &EngineConfig,
    demand: &LaneDemand,
    allocation: &LaneAllocation,
    cycle_budget: u32,
) -> Result<(), Violation> {
    let seconds = allocation.green_times();

    for lane in Lane::ALL {
        let s = seconds[lane.index()];
        if s < config.min_time || s > config.max_time {
            return Err(Violation::OutOfBounds {
                lane,
                seconds: s,
                min: config.min_time,
                max: config.max_time,
            });
        }
    }

    let total = allocation.total();
    if total != cycle_budget {
        return Err(Violation::BudgetMismatch {
            total,
            budget: cycle_budget,
        });
    }

    let counts = demand.counts();
    for i in 0..LANE_COUNT {
        for j in 0..LANE_COUNT {
            if counts[i] > counts[j] && seconds[i] + ORDER_TOLERANCE < seconds[j] {
                return Err(Violation::OrderInversion {
                    busier: Lane::ALL[i],
                    busier_seconds: seconds[i],
                    quieter: Lane::ALL[j],
                    quieter_seconds: seconds[j],
                    tolerance: ORDER_TOLERANCE,
                });
            }
        }
    }

    Ok(())
}

/// [`check`] as a sanity gate, logging the violation
pub fn validate(
    config: &EngineConfig,
    demand: &LaneDemand,
    allocation: &LaneAllocation,
    cycle_budget: u32,
) -> bool {
    match check(config, demand, allocation, cycle_budget) {
        Ok(()) => {
            debug!("Validation passed");
            true
        }
        Err(violation) => {
            warn!(
                demand = ?demand.counts(),
                green_times = ?allocation.green_times(),
                cycle_budget,
                %violation,
                "Timing plan failed validation"
            );
            false
        }
    }
}
