//! End-to-end tests for the timing engine
//!
//! Scenario tables from field deployments: light, normal, rush hour and
//! single-approach congestion.

use flextraff::engine::{check, validate, Error, FallbackReason};
use flextraff::{
    compute_allocation, compute_allocation_with_fallback, EngineConfig, LaneAllocation,
    LaneDemand, TimingEngine,
};

fn engine() -> TimingEngine {
    TimingEngine::new(EngineConfig::default()).unwrap()
}

#[test]
fn test_minimal_demand_uses_minimal_cycle() {
    let (green, budget) = compute_allocation(&[8, 12, 6, 10], &EngineConfig::default()).unwrap();
    assert_eq!(green.green_times(), &[15, 15, 15, 15]);
    assert_eq!(budget, 60);
}

#[test]
fn test_threshold_boundaries() {
    let config = EngineConfig::default();

    let (green, budget) = compute_allocation(&[25, 25, 25, 25], &config).unwrap();
    assert_eq!(budget, 120);
    assert!(green.green_times().iter().all(|&s| s == green.green_times()[0]));

    let (_, budget) = compute_allocation(&[26, 25, 25, 25], &config).unwrap();
    assert_eq!(budget, 130);
}

#[test]
fn test_ceiling_enforcement() {
    let (green, budget) = compute_allocation(&[100, 5, 5, 5], &EngineConfig::default()).unwrap();
    let seconds = green.green_times();
    assert!(seconds[0] <= 90);
    assert!(seconds[1..].iter().all(|&s| s >= 15));
    assert_eq!(green.total(), budget);
}

#[test]
fn test_rush_hour_favours_busiest_lane() {
    let demand = [45, 38, 52, 41];
    let (green, budget) = compute_allocation(&demand, &EngineConfig::default()).unwrap();
    assert!(budget > 120 && budget <= 180);
    let busiest = green.green_times().iter().copied().max().unwrap();
    assert_eq!(green.green_times()[2], busiest);
    assert!(engine().validate(&LaneDemand::new([45, 38, 52, 41]), &green, budget));
}

#[test]
fn test_uneven_distribution() {
    let (green, budget) = compute_allocation(&[60, 15, 18, 12], &EngineConfig::default()).unwrap();
    let s = green.green_times();
    assert!(s[0] > s[1] && s[0] > s[2] && s[0] > s[3]);
    assert!(s[0] <= 90);
    assert!(validate(&EngineConfig::default(), &LaneDemand::new([60, 15, 18, 12]), &green, budget));
}

#[test]
fn test_empty_lanes_still_get_minimum() {
    let (green, _) = compute_allocation(&[0, 0, 20, 30], &EngineConfig::default()).unwrap();
    let s = green.green_times();
    assert!(s.iter().all(|&t| t >= 15));
    assert!(s[3] >= s[2] && s[2] >= s[0]);
}

#[test]
fn test_custom_bounds() {
    let config = EngineConfig::default().with_bounds(20, 80);
    let demand = [30, 25, 35, 20];
    let (green, budget) = compute_allocation(&demand, &config).unwrap();
    assert!(green.green_times().iter().all(|&t| (20..=80).contains(&t)));
    assert_eq!(check(&config, &LaneDemand::new([30, 25, 35, 20]), &green, budget), Ok(()));
}

#[test]
fn test_invalid_input_rejected() {
    let config = EngineConfig::default();
    for bad in [&[10, 20, 30, 40, 50][..], &[10, 20, 30][..], &[][..]] {
        let err = compute_allocation(bad, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidLaneCount { .. }));
    }
    let err = compute_allocation(&[10, -5, 20, 30], &config).unwrap_err();
    assert!(matches!(err, Error::NegativeDemand { lane: 1, value: -5 }));
}

#[test]
fn test_fallback_is_deterministic() {
    let config = EngineConfig::default();
    for _ in 0..3 {
        let (green, budget, used_fallback) = compute_allocation_with_fallback(None, false, &config);
        assert_eq!(green, LaneAllocation::uniform(90));
        assert_eq!(budget, 360);
        assert!(used_fallback);
    }
}

#[test]
fn test_fallback_on_bad_input_never_fails() {
    let e = engine();
    for bad in [&[1, 2, 3][..], &[-1, 0, 0, 0][..]] {
        let (plan, reason) = e.allocate(Some(bad), false);
        assert!(plan.used_fallback);
        assert_eq!(reason, Some(FallbackReason::Pipeline));
        assert_eq!(plan.green_times, LaneAllocation::uniform(90));
    }
}

#[test]
fn test_forced_offline_overrides_live_demand() {
    let (green, budget, used_fallback) =
        compute_allocation_with_fallback(Some(&[25, 25, 25, 25]), true, &EngineConfig::default());
    assert!(used_fallback);
    assert_eq!(green, LaneAllocation::uniform(90));
    assert_eq!(budget, 360);
}

#[test]
fn test_budget_shrinks_instead_of_breaking_ceiling() {
    let config = EngineConfig::default().with_bounds(15, 25);
    let (green, budget) = compute_allocation(&[60, 50, 40, 30], &config).unwrap();
    assert_eq!(green, LaneAllocation::uniform(25));
    assert_eq!(budget, 100);
}

#[test]
fn test_idempotent() {
    let e = engine();
    for demand in [[25, 22, 28, 24], [100, 5, 5, 5], [0, 0, 0, 0], [500, 400, 300, 200]] {
        let first = e.compute_allocation(&demand).unwrap();
        let second = e.compute_allocation(&demand).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_concurrent_junctions_share_engine() {
    let e = engine();
    let demands: Vec<[i64; 4]> = (0..8).map(|i| [10 * i, 20, 30 + i, 5]).collect();
    let expected: Vec<_> = demands.iter().map(|d| e.compute_allocation(d).unwrap()).collect();

    let shared = &e;
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = demands
            .iter()
            .map(|d| scope.spawn(move || shared.compute_allocation(d).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, expected);
}
