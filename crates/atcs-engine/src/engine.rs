//! Timing engine: the allocation pipeline wrapped in the fallback policy

use std::fmt;
use std::time::Instant;

use atcs_core::{EngineConfig, LaneAllocation, LaneDemand, TimingPlan, ALGORITHM_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{
    record_allocation, record_cycle_budget, OUTCOME_COMPUTED, OUTCOME_FALLBACK_ERROR,
    OUTCOME_FALLBACK_NO_DEMAND, OUTCOME_FALLBACK_OFFLINE, OUTCOME_INVALID_INPUT,
};
use crate::{allocator, budget, ceiling, rounding, validate};

/// Why a request was answered with the fallback plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Caller signalled degraded connectivity
    Offline,
    /// Demand source supplied nothing
    NoDemand,
    /// Demand was malformed or the pipeline failed
    Pipeline,
}

impl FallbackReason {
    fn outcome(&self) -> &'static str {
        match self {
            FallbackReason::Offline => OUTCOME_FALLBACK_OFFLINE,
            FallbackReason::NoDemand => OUTCOME_FALLBACK_NO_DEMAND,
            FallbackReason::Pipeline => OUTCOME_FALLBACK_ERROR,
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Offline => write!(f, "offline"),
            FallbackReason::NoDemand => write!(f, "no_demand"),
            FallbackReason::Pipeline => write!(f, "pipeline"),
        }
    }
}

/// Engine parameters and metadata for status endpoints and logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub algorithm_version: String,
    pub min_green_time: u32,
    pub max_green_time: u32,
    pub base_cycle_time: u32,
    pub max_cycle_time: u32,
    pub yellow_time: u32,
    pub config_hash: String,
    pub description: String,
}

/// Stateless green-time allocator for one junction configuration
#[derive(Debug, Clone)]
pub struct TimingEngine {
    config: EngineConfig,
    fallback: LaneAllocation,
}

impl TimingEngine {
    /// Build an engine, rejecting configs the pipeline cannot honour
    pub fn new(config: EngineConfig) -> atcs_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fallback: LaneAllocation::uniform(config.max_time),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline on a validated snapshot
    pub fn compute(&self, demand: &LaneDemand) -> atcs_core::Result<TimingPlan> {
        let started = Instant::now();

        let initial = budget::cycle_budget(demand, &self.config);
        debug!(total = demand.total(), cycle_budget = initial, "Calculated cycle budget");

        let mut split = allocator::proportional_split(demand, initial, &self.config);
        let repair = ceiling::enforce_ceiling(demand, &mut split, initial, &self.config);
        let green_times = rounding::balance(demand, &split, repair.budget, &self.config)?;

        let elapsed = started.elapsed();
        record_allocation(OUTCOME_COMPUTED, elapsed);
        record_cycle_budget(repair.budget, repair.shrunk_by);
        info!(
            demand = ?demand.counts(),
            green_times = ?green_times.green_times(),
            cycle_budget = repair.budget,
            elapsed_us = elapsed.as_micros() as u64,
            "Calculated green times"
        );

        Ok(TimingPlan {
            green_times,
            cycle_budget: repair.budget,
            yellow_time: self.config.yellow_time,
            used_fallback: false,
        })
    }

    /// Allocate from raw counts, surfacing malformed input
    pub fn compute_allocation(&self, counts: &[i64]) -> atcs_core::Result<(LaneAllocation, u32)> {
        let demand = match LaneDemand::from_counts(counts) {
            Ok(demand) => demand,
            Err(e) => {
                record_allocation(OUTCOME_INVALID_INPUT, Default::default());
                return Err(e);
            }
        };
        let plan = self.compute(&demand)?;
        Ok((plan.green_times, plan.cycle_budget))
    }

    /// Allocate, answering with the fallback plan whenever live data cannot
    /// be trusted. Never fails.
    pub fn compute_allocation_with_fallback(
        &self,
        counts: Option<&[i64]>,
        force_offline: bool,
    ) -> TimingPlan {
        self.allocate(counts, force_offline).0
    }

    /// Like [`Self::compute_allocation_with_fallback`], also reporting why
    /// the fallback was used
    pub fn allocate(
        &self,
        counts: Option<&[i64]>,
        force_offline: bool,
    ) -> (TimingPlan, Option<FallbackReason>) {
        let started = Instant::now();

        let reason = if force_offline {
            FallbackReason::Offline
        } else {
            match counts {
                None | Some([]) => FallbackReason::NoDemand,
                Some(counts) => {
                    match LaneDemand::from_counts(counts).and_then(|d| self.compute(&d)) {
                        Ok(plan) => return (plan, None),
                        Err(e) => {
                            warn!(error = %e, "Timing calculation failed, using fallback");
                            FallbackReason::Pipeline
                        }
                    }
                }
            }
        };

        record_allocation(reason.outcome(), started.elapsed());
        info!(%reason, max_time = self.config.max_time, "Using fallback timing");
        (self.fallback_plan(), Some(reason))
    }

    /// Every lane at `max_time`
    pub fn fallback_plan(&self) -> TimingPlan {
        TimingPlan {
            green_times: self.fallback,
            cycle_budget: self.config.saturated_cycle(),
            yellow_time: self.config.yellow_time,
            used_fallback: true,
        }
    }

    /// Re-check a plan against this engine's bounds
    pub fn validate(&self, demand: &LaneDemand, allocation: &LaneAllocation, cycle_budget: u32) -> bool {
        validate::validate(&self.config, demand, allocation, cycle_budget)
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            algorithm_version: ALGORITHM_VERSION.to_string(),
            min_green_time: self.config.min_time,
            max_green_time: self.config.max_time,
            base_cycle_time: self.config.base_cycle_time,
            max_cycle_time: self.config.max_cycle_time,
            yellow_time: self.config.yellow_time,
            config_hash: self.config.compute_hash(),
            description: "ATCS adaptive traffic light timing calculator".to_string(),
        }
    }
}

/// One-shot allocation for callers that hold only a config
pub fn compute_allocation(
    demand: &[i64],
    config: &EngineConfig,
) -> atcs_core::Result<(LaneAllocation, u32)> {
    TimingEngine::new(*config)?.compute_allocation(demand)
}

/// One-shot allocation with the fallback policy; never fails
///
/// Returns `(green_times, cycle_budget, used_fallback)`.
pub fn compute_allocation_with_fallback(
    demand: Option<&[i64]>,
    force_offline: bool,
    config: &EngineConfig,
) -> (LaneAllocation, u32, bool) {
    let plan = match TimingEngine::new(*config) {
        Ok(engine) => engine.compute_allocation_with_fallback(demand, force_offline),
        Err(e) => {
            warn!(error = %e, "Rejected engine config, using fallback");
            TimingPlan {
                green_times: LaneAllocation::uniform(config.max_time),
                cycle_budget: config.saturated_cycle(),
                yellow_time: config.yellow_time,
                used_fallback: true,
            }
        }
    };
    (plan.green_times, plan.cycle_budget, plan.used_fallback)
}
