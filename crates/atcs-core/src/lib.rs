//! atcs-core: Core types for the FlexTraff adaptive traffic control system
//!
//! This crate defines the value types shared by the timing engine and the
//! controller:
//! - [`Lane`]: the four fixed approaches of a junction
//! - [`LaneDemand`]: one validated vehicle-count snapshot
//! - [`LaneAllocation`] / [`TimingPlan`]: green seconds per lane for one cycle
//! - [`EngineConfig`]: immutable timing bounds for an engine instance
//!
//! # Timing invariants
//!
//! Every plan produced from a valid demand snapshot satisfies:
//!
//! | Invariant | Rule |
//! |-----------|------|
//! | Bounds | every lane in `[min_time, max_time]` |
//! | Conservation | `sum(green_times) == cycle_budget` |
//! | Ordering | `demand_i > demand_j` ⇒ `green_i >= green_j - 2` |
//!
//! Yellow clearance is never allocated. It is added on top of the cycle budget
//! (see [`TimingPlan::total_cycle_time`]).

mod allocation;
mod config;
mod demand;
mod error;
mod lane;

pub use allocation::{LaneAllocation, TimingPlan};
pub use config::{EngineConfig, ALGORITHM_VERSION};
pub use demand::LaneDemand;
pub use error::Error;
pub use lane::Lane;

pub type Result<T> = std::result::Result<T, Error>;

/// Constants for the timing algorithm
pub mod constants {
    /// Number of approaches at a junction
    pub const LANE_COUNT: usize = 4;

    /// Total vehicles a base cycle absorbs before it starts growing
    pub const DEMAND_THRESHOLD: u64 = 100;

    /// Vehicles per cycle increment above the threshold
    pub const VEHICLES_PER_INCREMENT: u64 = 10;

    /// Seconds added to the cycle per increment
    pub const SECONDS_PER_INCREMENT: u32 = 10;

    /// Upper bound on ceiling redistribution rounds
    pub const MAX_REPAIR_ITERATIONS: usize = 10;

    /// Allowed inversion (seconds) between a busier lane and a quieter one
    pub const ORDER_TOLERANCE: u32 = 2;

    /// Status history kept by the connectivity tracker
    pub const CONNECTIVITY_HISTORY: usize = 10;
}
