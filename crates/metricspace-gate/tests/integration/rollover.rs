//! Lazy billing-period rollover.

use std::sync::Arc;

use chrono::Duration;
use metricspace_core::{CalendarMonthAndYear, Quota};
use metricspace_gate::Session;

use crate::common::{TestHarness, at};

#[test]
fn test_record_after_rollover_starts_at_one() {
    let harness = TestHarness::starting_at(at(2026, 1, 31));
    let session = Session::anonymous();
    harness.gate.record_calculation(&session, "velocity");
    harness.gate.record_calculation(&session, "velocity");
    assert_eq!(harness.gate.usage(&session).calculations_this_month, 2);

    harness.clock.advance(Duration::days(1));
    let record = harness.gate.record_calculation(&session, "velocity");
    assert_eq!(record.calculations_this_month, 1);
    assert_eq!(record.last_calculation_date, Some(at(2026, 2, 1)));
}

#[test]
fn test_rollover_is_lazy() {
    let harness = TestHarness::starting_at(at(2026, 4, 20));
    let session = Session::anonymous();
    for _ in 0..5 {
        harness.gate.record_calculation(&session, "velocity");
    }
    assert!(!harness.gate.check_calculation_limit(&session).allowed);

    harness.clock.set(at(2026, 5, 1));
    assert!(harness.gate.check_calculation_limit(&session).allowed);
    // Stored count is untouched until the next calculation.
    assert_eq!(harness.gate.usage(&session).calculations_this_month, 5);
}

#[test]
fn test_month_only_policy_ignores_year() {
    let harness = TestHarness::starting_at(at(2025, 6, 10));
    let session = Session::anonymous();
    harness.seed_usage(&session, 5, at(2025, 6, 10));

    harness.clock.set(at(2026, 6, 3));
    let status = harness.gate.check_calculation_limit(&session);
    assert!(!status.allowed);
    assert_eq!(status.limit, Quota::Count(5));
}

#[test]
fn test_month_and_year_policy_rolls_over_yearly() {
    let harness = TestHarness::with_period(Arc::new(CalendarMonthAndYear), at(2026, 6, 3));
    let session = Session::anonymous();
    harness.seed_usage(&session, 5, at(2025, 6, 10));

    let status = harness.gate.check_calculation_limit(&session);
    assert!(status.allowed);
    assert_eq!(status.remaining, Some(5));
    let record = harness.gate.record_calculation(&session, "velocity");
    assert_eq!(record.calculations_this_month, 1);
}
