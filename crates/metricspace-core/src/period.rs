//! Billing-period policies used for lazy usage rollover.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Decides whether two instants fall in the same billing period.
///
/// Any `Fn(DateTime<Utc>, DateTime<Utc>) -> bool` is a policy.
pub trait BillingPeriod: Send + Sync {
    /// Returns `true` if `previous` and `now` share a billing period.
    fn is_same_billing_period(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool;
}

impl<F> BillingPeriod for F
where
    F: Fn(DateTime<Utc>, DateTime<Utc>) -> bool + Send + Sync,
{
    fn is_same_billing_period(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self(previous, now)
    }
}

/// Compares only the calendar month, ignoring the year.
///
/// March of one year and March of the next count as the same period.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarMonth;

impl BillingPeriod for CalendarMonth {
    fn is_same_billing_period(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        previous.month() == now.month()
    }
}

/// Compares calendar month and year.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarMonthAndYear;

impl BillingPeriod for CalendarMonthAndYear {
    fn is_same_billing_period(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        previous.month() == now.month() && previous.year() == now.year()
    }
}

/// Configurable selection of a built-in policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingPeriodKind {
    /// [`CalendarMonth`]
    #[default]
    CalendarMonth,
    /// [`CalendarMonthAndYear`]
    CalendarMonthAndYear,
}

impl BillingPeriodKind {
    /// Instantiates the selected policy.
    pub fn policy(self) -> Arc<dyn BillingPeriod> {
        match self {
            BillingPeriodKind::CalendarMonth => Arc::new(CalendarMonth),
            BillingPeriodKind::CalendarMonthAndYear => Arc::new(CalendarMonthAndYear),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_month_boundary_is_new_period() {
        assert!(!CalendarMonth.is_same_billing_period(at(2026, 1, 31), at(2026, 2, 1)));
        assert!(!CalendarMonthAndYear.is_same_billing_period(at(2026, 1, 31), at(2026, 2, 1)));
    }

    #[test]
    fn test_same_month_same_period() {
        assert!(CalendarMonth.is_same_billing_period(at(2026, 3, 1), at(2026, 3, 31)));
        assert!(CalendarMonthAndYear.is_same_billing_period(at(2026, 3, 1), at(2026, 3, 31)));
    }

    #[test]
    fn test_month_only_ignores_year() {
        assert!(CalendarMonth.is_same_billing_period(at(2025, 6, 10), at(2026, 6, 10)));
        assert!(!CalendarMonthAndYear.is_same_billing_period(at(2025, 6, 10), at(2026, 6, 10)));
    }

    #[test]
    fn test_closure_policy() {
        let never = |_: DateTime<Utc>, _: DateTime<Utc>| false;
        assert!(!never.is_same_billing_period(at(2026, 1, 1), at(2026, 1, 1)));
    }

    #[test]
    fn test_kind_serde_and_policy() {
        let kind: BillingPeriodKind =
            serde_json::from_str("\"calendar-month-and-year\"").unwrap();
        assert_eq!(kind, BillingPeriodKind::CalendarMonthAndYear);
        let policy = kind.policy();
        assert!(!policy.is_same_billing_period(at(2025, 6, 10), at(2026, 6, 10)));
        assert_eq!(BillingPeriodKind::default(), BillingPeriodKind::CalendarMonth);
    }
}
