//! Property-based tests for usage rollover and calculators.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::calculator::{Calculator, Row};
    use crate::period::{BillingPeriod, CalendarMonth, CalendarMonthAndYear};
    use crate::usage::UsageRecord;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn instant() -> impl Strategy<Value = DateTime<Utc>> {
        (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24)
            .prop_map(|(y, m, d, h)| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    proptest! {
        #[test]
        fn test_recorded_is_one_more_or_one(
            count in 0u32..10_000,
            last in instant(),
            now in instant(),
        ) {
            let record = UsageRecord {
                calculations_this_month: count,
                last_calculation_date: Some(last),
            };
            let next = record.recorded(now, &CalendarMonth);
            if CalendarMonth.is_same_billing_period(last, now) {
                prop_assert_eq!(next.calculations_this_month, count + 1);
            } else {
                prop_assert_eq!(next.calculations_this_month, 1);
            }
            prop_assert_eq!(next.last_calculation_date, Some(now));
        }

        #[test]
        fn test_month_and_year_is_stricter(a in instant(), b in instant()) {
            if CalendarMonthAndYear.is_same_billing_period(a, b) {
                prop_assert!(CalendarMonth.is_same_billing_period(a, b));
            }
        }

        #[test]
        fn test_effective_count_never_exceeds_stored(
            count in 0u32..10_000,
            last in instant(),
            now in instant(),
        ) {
            let record = UsageRecord {
                calculations_this_month: count,
                last_calculation_date: Some(last),
            };
            prop_assert!(record.effective_count(now, &CalendarMonthAndYear) <= count);
        }

        #[test]
        fn test_throughput_single_row(items in 0u32..10_000, days in 1u32..365) {
            let row = Row::from([
                ("itemsCompleted".to_string(), items.to_string()),
                ("days".to_string(), days.to_string()),
            ]);
            let value = Calculator::Throughput.compute(&[row]).unwrap();
            prop_assert!((value - f64::from(items) / f64::from(days)).abs() < 1e-9);
        }
    }
}
