//! Connectivity tracking for offline fallback
//!
//! Probing is done elsewhere; this only folds probe results into an
//! online/offline decision and keeps a short history.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use atcs_core::constants::CONNECTIVITY_HISTORY;
use atcs_core::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of one round of reachability probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub internet: bool,
    /// `None` when no backend is configured
    #[serde(default)]
    pub backend: Option<bool>,
    #[serde(default)]
    pub detection: bool,
}

impl ProbeReport {
    /// Online needs internet, plus the backend if one is configured
    pub fn is_online(&self) -> bool {
        self.internet && self.backend.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityMode {
    Online,
    OfflineFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityStatus {
    pub report: ProbeReport,
    pub is_online: bool,
    pub mode: ConnectivityMode,
    pub timestamp_ms: u64,
}

/// What the junction does while offline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackModeInfo {
    pub fallback_mode_active: bool,
    pub green_time_per_lane: u32,
    pub yellow_time_per_lane: u32,
    pub total_cycle_time: u32,
}

#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    is_online: bool,
    history: VecDeque<ConnectivityStatus>,
    max_history: usize,
}

impl ConnectivityTracker {
    pub fn new() -> Self {
        Self::with_history(CONNECTIVITY_HISTORY)
    }

    pub fn with_history(max_history: usize) -> Self {
        Self {
            is_online: true,
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Fold a probe report into the current status
    pub fn update(&mut self, report: ProbeReport) -> ConnectivityStatus {
        let was_online = self.is_online;
        self.is_online = report.is_online();

        let status = ConnectivityStatus {
            report,
            is_online: self.is_online,
            mode: self.mode(),
            timestamp_ms: now_ms(),
        };

        if self.max_history > 0 {
            if self.history.len() == self.max_history {
                self.history.pop_front();
            }
            self.history.push_back(status);
        }

        match (was_online, self.is_online) {
            (true, false) => warn!(
                internet = report.internet,
                backend = ?report.backend,
                detection = report.detection,
                "Connectivity lost, switching to fallback timing"
            ),
            (false, true) => info!("Connectivity restored, using adaptive timing"),
            _ => {}
        }

        status
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn mode(&self) -> ConnectivityMode {
        if self.is_online {
            ConnectivityMode::Online
        } else {
            ConnectivityMode::OfflineFallback
        }
    }

    /// Oldest first
    pub fn history(&self) -> impl Iterator<Item = &ConnectivityStatus> {
        self.history.iter()
    }

    pub fn fallback_mode_info(&self, config: &EngineConfig) -> FallbackModeInfo {
        FallbackModeInfo {
            fallback_mode_active: !self.is_online,
            green_time_per_lane: config.max_time,
            yellow_time_per_lane: config.yellow_time,
            total_cycle_time: config
                .saturated_cycle()
                .saturating_add(config.yellow_time.saturating_mul(4)),
        }
    }
}

impl Default for ConnectivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
