//! Quota and access scenarios for the free, pro, and enterprise plans.

use std::cell::Cell;

use metricspace_core::{PlanId, Quota};
use metricspace_gate::{CALCULATION_BLOCKED_EVENT, LimitStatus, Session, UserProfile};
use serde_json::json;

use crate::common::{TestHarness, at};

#[test]
fn test_free_quota_exhausted_blocks_calculation() {
    let harness = TestHarness::new();
    let session = Session::anonymous();
    harness.seed_usage(&session, 5, at(2026, 3, 2));

    assert_eq!(
        harness.gate.check_calculation_limit(&session),
        LimitStatus {
            allowed: false,
            remaining: Some(0),
            limit: Quota::Count(5),
        }
    );

    let called = Cell::new(false);
    let result = harness
        .gate
        .perform_calculation(&session, "velocity", || called.set(true));
    assert!(result.is_none());
    assert!(!called.get());

    let event = harness.events.last(CALCULATION_BLOCKED_EVENT).unwrap();
    assert_eq!(event.attrs.get("reason"), Some(&json!("limit_reached")));
    assert_eq!(harness.gate.usage(&session).calculations_this_month, 5);
}

#[test]
fn test_previous_month_count_treated_as_zero() {
    let harness = TestHarness::new();
    let session = Session::anonymous();
    harness.seed_usage(&session, 4, at(2026, 2, 27));

    assert_eq!(
        harness.gate.check_calculation_limit(&session),
        LimitStatus {
            allowed: true,
            remaining: Some(5),
            limit: Quota::Count(5),
        }
    );
}

#[test]
fn test_perform_calls_compute_exactly_once() {
    let harness = TestHarness::new();
    let session = Session::anonymous();
    let calls = Cell::new(0);

    let result = harness.gate.perform_calculation(&session, "throughput", || {
        calls.set(calls.get() + 1);
        12.0 / 4.0
    });

    assert_eq!(result, Some(3.0));
    assert_eq!(calls.get(), 1);
    assert_eq!(harness.gate.usage(&session).calculations_this_month, 1);
}

#[test]
fn test_five_free_calculations_then_blocked() {
    let harness = TestHarness::new();
    let session = Session::anonymous();

    for expected_remaining in (0..5).rev() {
        assert!(harness.gate.perform_calculation(&session, "velocity", || ()).is_some());
        assert_eq!(
            harness.gate.check_calculation_limit(&session).remaining,
            Some(expected_remaining)
        );
    }
    assert!(harness.gate.perform_calculation(&session, "velocity", || ()).is_none());
}

#[test]
fn test_pro_plan_reaches_more_calculators() {
    let harness = TestHarness::new();
    let mut session = Session::login(UserProfile::new("u-pro", PlanId::Free));
    assert!(!harness.gate.check_access(&session, "flow-efficiency"));

    session.upgrade(PlanId::Pro).unwrap();
    assert!(harness.gate.check_access(&session, "flow-efficiency"));
    assert!(!harness.gate.check_access(&session, "utilization"));
    assert_eq!(
        harness.gate.check_calculation_limit(&session).limit,
        Quota::Count(100)
    );
}

#[test]
fn test_enterprise_unlimited_regardless_of_count() {
    let harness = TestHarness::new();
    let session = Session::login(UserProfile::new("u-ent", PlanId::Enterprise));
    harness.seed_usage(&session, 1_000_000, at(2026, 3, 1));

    let status = harness.gate.check_calculation_limit(&session);
    assert!(status.allowed);
    assert_eq!(status.remaining, None);
    assert_eq!(status.limit, Quota::Unlimited);
    assert!(harness.gate.perform_calculation(&session, "anything", || ()).is_some());
}

#[test]
fn test_downgrade_keeps_usage_and_goes_negative() {
    let harness = TestHarness::new();
    let mut session = Session::login(UserProfile::new("u-down", PlanId::Pro));
    for _ in 0..8 {
        harness.gate.record_calculation(&session, "velocity");
    }

    session.cancel().unwrap();
    let status = harness.gate.check_calculation_limit(&session);
    assert!(!status.allowed);
    assert_eq!(status.remaining, Some(-3));
}
