//! Allocation metrics
//!
//! Only outcome labels; demand values never become label values.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub const OUTCOME_COMPUTED: &str = "computed";
pub const OUTCOME_INVALID_INPUT: &str = "invalid_input";
pub const OUTCOME_FALLBACK_OFFLINE: &str = "fallback_offline";
pub const OUTCOME_FALLBACK_NO_DEMAND: &str = "fallback_no_demand";
pub const OUTCOME_FALLBACK_ERROR: &str = "fallback_error";

pub fn record_allocation(outcome: &str, duration: Duration) {
    counter!("atcs_allocations_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("atcs_allocation_duration_seconds", "outcome" => outcome.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_cycle_budget(budget: u32, shrunk_by: u32) {
    histogram!("atcs_cycle_budget_seconds").record(f64::from(budget));
    if shrunk_by > 0 {
        counter!("atcs_cycle_budget_shrunk_total").increment(1);
    }
}

/// Install the process-wide Prometheus recorder; render the handle to export
pub fn init_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineConfig, TimingEngine};

    fn rendered(f: impl FnOnce()) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, f);
        handle.render()
    }

    #[test]
    fn test_outcomes_are_counted() {
        let out = rendered(|| {
            let engine = TimingEngine::new(EngineConfig::default()).unwrap();
            engine.allocate(Some(&[25, 25, 25, 25]), false);
            engine.allocate(Some(&[45, 38, 52, 41]), false);
            engine.allocate(Some(&[25, 25, 25, 25]), true);
            engine.allocate(None, false);
            engine.allocate(Some(&[1, -1, 1, 1]), false);
            let _ = engine.compute_allocation(&[1, 2, 3]);
        });

        assert!(out.contains(r#"atcs_allocations_total{outcome="computed"} 2"#), "{out}");
        assert!(out.contains(r#"atcs_allocations_total{outcome="fallback_offline"} 1"#));
        assert!(out.contains(r#"atcs_allocations_total{outcome="fallback_no_demand"} 1"#));
        assert!(out.contains(r#"atcs_allocations_total{outcome="fallback_error"} 1"#));
        assert!(out.contains(r#"atcs_allocations_total{outcome="invalid_input"} 1"#));
        assert!(out.contains("atcs_allocation_duration_seconds"));
        assert!(out.contains("atcs_cycle_budget_seconds"));
    }

    #[test]
    fn test_shrunk_budget_is_counted() {
        let config = EngineConfig::new(15, 25, 100, 180);
        let out = rendered(|| {
            let engine = TimingEngine::new(config).unwrap();
            engine.compute_allocation(&[200, 200, 200, 200]).unwrap();
        });
        assert!(out.contains("atcs_cycle_budget_shrunk_total 1"), "{out}");
    }
}
