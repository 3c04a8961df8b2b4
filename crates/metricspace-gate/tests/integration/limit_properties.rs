//! Property-based tests for quota checks.

use metricspace_core::{AllowedCalculators, Plan, PlanCatalog, PlanId, Quota};
use metricspace_gate::Session;
use proptest::prelude::*;

use crate::common::{TestHarness, at};

fn harness_with_free_limit(limit: Quota) -> TestHarness {
    let mut harness = TestHarness::new();
    let catalog = PlanCatalog::standard().with_plan(Plan {
        id: PlanId::Free,
        calculations_per_month: limit,
        allowed_calculators: AllowedCalculators::All,
    });
    harness.gate = harness.gate.with_catalog(catalog);
    harness
}

proptest! {
    #[test]
    fn test_allowed_iff_count_below_limit(limit in 0u32..50, count in 0u32..100) {
        let harness = harness_with_free_limit(Quota::Count(limit));
        let session = Session::anonymous();
        harness.seed_usage(&session, count, at(2026, 3, 1));

        let status = harness.gate.check_calculation_limit(&session);
        prop_assert_eq!(status.allowed, count < limit);
        prop_assert_eq!(status.remaining, Some(i64::from(limit) - i64::from(count)));
        if !status.allowed {
            prop_assert!(status.remaining.unwrap() <= 0);
        }
    }

    #[test]
    fn test_unlimited_always_allowed(count in any::<u32>()) {
        let harness = harness_with_free_limit(Quota::Unlimited);
        let session = Session::anonymous();
        harness.seed_usage(&session, count, at(2026, 3, 1));

        let status = harness.gate.check_calculation_limit(&session);
        prop_assert!(status.allowed);
        prop_assert_eq!(status.limit, Quota::Unlimited);
        prop_assert_eq!(status.remaining, None);
    }

    #[test]
    fn test_record_adds_exactly_one(count in 0u32..1000) {
        let harness = harness_with_free_limit(Quota::Count(2000));
        let session = Session::anonymous();
        harness.seed_usage(&session, count, at(2026, 3, 10));

        let before = harness.gate.check_calculation_limit(&session).remaining.unwrap();
        harness.gate.record_calculation(&session, "velocity");
        let after = harness.gate.check_calculation_limit(&session).remaining.unwrap();
        prop_assert_eq!(before - after, 1);
    }

    #[test]
    fn test_record_after_rollover_is_one(count in 0u32..1000) {
        let harness = harness_with_free_limit(Quota::Count(2000));
        let session = Session::anonymous();
        harness.seed_usage(&session, count, at(2026, 2, 10));

        let record = harness.gate.record_calculation(&session, "velocity");
        prop_assert_eq!(record.calculations_this_month, 1);
    }
}
