//! Timing engine configuration

use serde::{Deserialize, Serialize};

use crate::constants::LANE_COUNT;
use crate::Error;

/// Algorithm version reported by engine info
pub const ALGORITHM_VERSION: &str = "v1.0";

/// Timing bounds for one engine instance
///
/// Immutable once an engine is built from it. All values are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum green time per lane; also the fixed-lane demand threshold
    #[serde(default = "default_min_time")]
    pub min_time: u32,
    /// Maximum green time per lane
    #[serde(default = "default_max_time")]
    pub max_time: u32,
    /// Cycle budget while total demand stays at or below the threshold
    #[serde(default = "default_base_cycle_time")]
    pub base_cycle_time: u32,
    /// Upper bound on the demand-scaled cycle budget
    #[serde(default = "default_max_cycle_time")]
    pub max_cycle_time: u32,
    /// Clearance interval after each green phase (0 disables)
    #[serde(default = "default_yellow_time")]
    pub yellow_time: u32,
}

fn default_min_time() -> u32 {
    15
}

fn default_max_time() -> u32 {
    90
}

fn default_base_cycle_time() -> u32 {
    120
}

fn default_max_cycle_time() -> u32 {
    180
}

fn default_yellow_time() -> u32 {
    5
}

impl EngineConfig {
    pub fn new(min_time: u32, max_time: u32, base_cycle_time: u32, max_cycle_time: u32) -> Self {
        Self {
            min_time,
            max_time,
            base_cycle_time,
            max_cycle_time,
            yellow_time: default_yellow_time(),
        }
    }

    pub fn with_bounds(mut self, min_time: u32, max_time: u32) -> Self {
        self.min_time = min_time;
        self.max_time = max_time;
        self
    }

    pub fn with_cycle(mut self, base_cycle_time: u32, max_cycle_time: u32) -> Self {
        self.base_cycle_time = base_cycle_time;
        self.max_cycle_time = max_cycle_time;
        self
    }

    pub fn with_yellow_time(mut self, yellow_time: u32) -> Self {
        self.yellow_time = yellow_time;
        self
    }

    /// Check the relations the allocator relies on
    pub fn validate(&self) -> crate::Result<()> {
        if self.min_time == 0 || self.max_time == 0 {
            return Err(Error::InvalidConfig(
                "min_time and max_time must be positive".into(),
            ));
        }
        if self.min_time >= self.max_time {
            return Err(Error::InvalidConfig(format!(
                "min_time ({}) must be below max_time ({})",
                self.min_time, self.max_time
            )));
        }
        if self.base_cycle_time > self.max_cycle_time {
            return Err(Error::InvalidConfig(format!(
                "base_cycle_time ({}) exceeds max_cycle_time ({})",
                self.base_cycle_time, self.max_cycle_time
            )));
        }
        if self.minimal_cycle() > self.base_cycle_time {
            return Err(Error::InvalidConfig(format!(
                "base_cycle_time ({}) cannot cover {} lanes at min_time ({})",
                self.base_cycle_time, LANE_COUNT, self.min_time
            )));
        }
        let lanes = LANE_COUNT as u32;
        let longest = lanes.checked_mul(self.max_time).and_then(|green| {
            lanes
                .checked_mul(self.yellow_time)
                .and_then(|yellow| green.checked_add(yellow))
        });
        if longest.is_none() {
            return Err(Error::InvalidConfig(format!(
                "max_time ({}) and yellow_time ({}) overflow the cycle length",
                self.max_time, self.yellow_time
            )));
        }
        Ok(())
    }

    /// Cycle where every lane gets exactly `min_time`
    pub fn minimal_cycle(&self) -> u32 {
        (LANE_COUNT as u32).saturating_mul(self.min_time)
    }

    /// Cycle where every lane gets exactly `max_time`
    pub fn saturated_cycle(&self) -> u32 {
        (LANE_COUNT as u32).saturating_mul(self.max_time)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Hash of the timing parameters for change detection
    ///
    /// Uses `DefaultHasher`, so the value is only stable for one build of
    /// the toolchain. Do not persist it as a long-lived key.
    pub fn compute_hash(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        ALGORITHM_VERSION.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(
            default_min_time(),
            default_max_time(),
            default_base_cycle_time(),
            default_max_cycle_time(),
        )
    }
}
