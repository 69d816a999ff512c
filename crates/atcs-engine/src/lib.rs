//! atcs-engine: Adaptive green-time allocation for a four-way junction
//!
//! Each request runs four stages in order:
//! 1. [`budget`]: total green seconds from aggregate demand
//! 2. [`allocator`]: demand-proportional split above a per-lane floor
//! 3. [`ceiling`]: bounded redistribution of time above the per-lane ceiling
//! 4. [`rounding`]: whole seconds that still sum to the budget
//!
//! [`TimingEngine`] wraps the pipeline with the fallback policy, and
//! [`validate`] re-checks any plan against the same invariants.
//!
//! The engine holds only its immutable [`EngineConfig`]; it is `Send + Sync`
//! and can be shared across junctions without locking.

pub mod allocator;
pub mod budget;
pub mod ceiling;
pub mod engine;
pub mod metrics;
pub mod rounding;
pub mod validate;

pub use atcs_core::{EngineConfig, Error, Lane, LaneAllocation, LaneDemand, Result, TimingPlan};
pub use engine::{
    compute_allocation, compute_allocation_with_fallback, EngineInfo, FallbackReason, TimingEngine,
};
pub use validate::{check, validate, Violation};
