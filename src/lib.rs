//! FlexTraff adaptive traffic control
//!
//! Facade over the workspace crates:
//! - [`core`]: lane, demand, allocation and config types
//! - [`engine`]: the green-time allocation pipeline and fallback policy
//! - [`controller`]: control loop, connectivity tracking, cycle recording

pub use atcs_controller as controller;
pub use atcs_core as core;
pub use atcs_engine as engine;

pub use atcs_engine::{
    compute_allocation, compute_allocation_with_fallback, EngineConfig, LaneAllocation,
    LaneDemand, TimingEngine, TimingPlan,
};
