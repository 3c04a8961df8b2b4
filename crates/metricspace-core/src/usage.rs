//! Monthly usage counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::period::BillingPeriod;

/// A user's calculation count for the current billing period.
///
/// Rollover is lazy: a stale count stays in storage until the next
/// calculation overwrites it, and readers treat it as zero in the meantime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Calculations recorded in the period of `last_calculation_date`.
    pub calculations_this_month: u32,
    /// When the most recent calculation was recorded.
    pub last_calculation_date: Option<DateTime<Utc>>,
}

impl UsageRecord {
    /// Returns `true` if the stored count belongs to an earlier period.
    ///
    /// A record that never saw a calculation has not rolled over.
    pub fn has_rolled_over(&self, now: DateTime<Utc>, period: &dyn BillingPeriod) -> bool {
        self.last_calculation_date
            .is_some_and(|last| !period.is_same_billing_period(last, now))
    }

    /// Count to use for limit checks at `now`.
    pub fn effective_count(&self, now: DateTime<Utc>, period: &dyn BillingPeriod) -> u32 {
        if self.has_rolled_over(now, period) {
            0
        } else {
            self.calculations_this_month
        }
    }

    /// The record after one more calculation at `now`.
    pub fn recorded(&self, now: DateTime<Utc>, period: &dyn BillingPeriod) -> Self {
        Self {
            calculations_this_month: self.effective_count(now, period).saturating_add(1),
            last_calculation_date: Some(now),
        }
    }
}
