//! Common test utilities and harness for gate integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use metricspace_core::{BillingPeriod, CalendarMonth, FixedClock, MemorySink, UsageRecord};
use metricspace_gate::{Session, SubscriptionGate};
use metricspace_storage::PersistenceStore;

/// Test harness wiring a gate to an in-memory store, a recording event sink,
/// and a clock the test controls.
pub struct TestHarness {
    /// Store shared by the gate and the test
    pub store: Arc<PersistenceStore>,
    /// Every event the gate and store emitted
    pub events: Arc<MemorySink>,
    /// The gate's notion of "now"
    pub clock: Arc<FixedClock>,
    /// Gate under test
    pub gate: SubscriptionGate,
}

impl TestHarness {
    /// Creates a harness at mid-March 2026 with month-only rollover.
    pub fn new() -> Self {
        Self::starting_at(at(2026, 3, 15))
    }

    /// Creates a harness whose clock starts at `now`.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self::with_period(Arc::new(CalendarMonth), now)
    }

    /// Creates a harness with a specific rollover policy.
    pub fn with_period(period: Arc<dyn BillingPeriod>, now: DateTime<Utc>) -> Self {
        let events = Arc::new(MemorySink::new());
        let store = Arc::new(PersistenceStore::new(
            metricspace_storage::MemoryBackend::new(),
            events.clone(),
        ));
        let clock = Arc::new(FixedClock::new(now));
        let gate = SubscriptionGate::new(store.clone())
            .with_events(events.clone())
            .with_clock(clock.clone())
            .with_period(period);
        Self {
            store,
            events,
            clock,
            gate,
        }
    }

    /// Stores a usage record for `session` directly.
    pub fn seed_usage(&self, session: &Session, count: u32, last: DateTime<Utc>) {
        self.store.write(
            &session.usage_key(),
            &UsageRecord {
                calculations_this_month: count,
                last_calculation_date: Some(last),
            },
        );
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Noon UTC on the given date.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}
