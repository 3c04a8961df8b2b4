//! The subscription gate.
//!
//! Answers two questions for a [`Session`]: may this calculator be opened,
//! and may one more calculation run this billing period. Recording a
//! calculation is the gate's only side effect.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use metricspace_gate::{Session, SubscriptionGate};
//! use metricspace_storage::PersistenceStore;
//!
//! let gate = SubscriptionGate::new(Arc::new(PersistenceStore::in_memory()));
//! let session = Session::anonymous();
//!
//! assert!(gate.check_access(&session, "velocity"));
//! let result = gate.perform_calculation(&session, "velocity", || 21.0 / 0.7);
//! assert!(result.is_some());
//! assert_eq!(gate.usage(&session).calculations_this_month, 1);
//! ```

use std::fmt;
use std::sync::Arc;

use metricspace_core::events::{attrs, emit_best_effort};
use metricspace_core::{
    BillingPeriod, CalendarMonth, Calculator, Clock, EventSink, NullSink, Plan, PlanCatalog,
    Quota, SystemClock, UsageRecord,
};
use metricspace_storage::PersistenceStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Session;

/// Event emitted after a calculation is recorded.
pub const CALCULATION_RECORDED_EVENT: &str = "calculation_recorded";

/// Event emitted when [`SubscriptionGate::perform_calculation`] refuses.
pub const CALCULATION_BLOCKED_EVENT: &str = "calculation_blocked";

// ============================================================================
// LimitStatus
// ============================================================================

/// Result of a monthly-quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatus {
    /// Whether one more calculation may run.
    pub allowed: bool,
    /// Calculations left this period; absent for unlimited plans. Zero or
    /// negative once the quota is used up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    /// The plan's monthly quota.
    pub limit: Quota,
}

impl LimitStatus {
    fn unlimited() -> Self {
        Self {
            allowed: true,
            remaining: None,
            limit: Quota::Unlimited,
        }
    }
}

// ============================================================================
// BlockReason
// ============================================================================

/// Why a calculation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The plan does not include the calculator.
    NoAccess,
    /// The plan's monthly quota is used up.
    LimitReached,
}

impl BlockReason {
    /// Label used in analytics.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::NoAccess => "no_access",
            BlockReason::LimitReached => "limit_reached",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SubscriptionGate
// ============================================================================

/// Plan and quota policy over a shared [`PersistenceStore`].
pub struct SubscriptionGate {
    catalog: PlanCatalog,
    store: Arc<PersistenceStore>,
    events: Arc<dyn EventSink>,
    period: Arc<dyn BillingPeriod>,
    clock: Arc<dyn Clock>,
}

impl SubscriptionGate {
    /// Creates a gate with the standard catalog, month-only rollover, the
    /// system clock, and no analytics.
    pub fn new(store: Arc<PersistenceStore>) -> Self {
        Self {
            catalog: PlanCatalog::standard(),
            store,
            events: Arc::new(NullSink),
            period: Arc::new(CalendarMonth),
            clock: Arc::new(SystemClock),
        }
    }

    /// Uses `catalog` instead of the standard plans.
    pub fn with_catalog(mut self, catalog: PlanCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Reports gate events to `events`.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Uses `period` to decide when usage rolls over.
    pub fn with_period(mut self, period: Arc<dyn BillingPeriod>) -> Self {
        self.period = period;
        self
    }

    /// Reads "now" from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The plan catalog in use.
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// The session's current plan.
    pub fn plan(&self, session: &Session) -> &Plan {
        self.catalog.plan(session.plan())
    }

    /// Returns `true` if the session's plan may open `calculator_id`.
    pub fn check_access(&self, session: &Session, calculator_id: &str) -> bool {
        self.plan(session).allows(calculator_id)
    }

    /// Catalog calculators the session's plan may open.
    pub fn visible_calculators(&self, session: &Session) -> Vec<Calculator> {
        Calculator::ALL
            .into_iter()
            .filter(|c| self.check_access(session, c.id()))
            .collect()
    }

    /// The session's stored usage record, or an empty one.
    pub fn usage(&self, session: &Session) -> UsageRecord {
        self.store.read(&session.usage_key(), UsageRecord::default())
    }

    /// Whether one more calculation fits in this period's quota.
    pub fn check_calculation_limit(&self, session: &Session) -> LimitStatus {
        let limit = match self.plan(session).calculations_per_month {
            Quota::Unlimited => return LimitStatus::unlimited(),
            Quota::Count(limit) => limit,
        };
        let count = self
            .usage(session)
            .effective_count(self.clock.now(), self.period.as_ref());
        LimitStatus {
            allowed: count < limit,
            remaining: Some(i64::from(limit) - i64::from(count)),
            limit: Quota::Count(limit),
        }
    }

    /// Why a calculation with `calculator_id` would be refused, if it would.
    pub fn block_reason(&self, session: &Session, calculator_id: &str) -> Option<BlockReason> {
        if !self.check_access(session, calculator_id) {
            Some(BlockReason::NoAccess)
        } else if !self.check_calculation_limit(session).allowed {
            Some(BlockReason::LimitReached)
        } else {
            None
        }
    }

    /// Counts one calculation against the session's quota and persists it.
    ///
    /// Does not check the quota; callers check first.
    pub fn record_calculation(&self, session: &Session, calculator_id: &str) -> UsageRecord {
        let key = session.usage_key();
        let now = self.clock.now();
        let record = self
            .store
            .read(&key, UsageRecord::default())
            .recorded(now, self.period.as_ref());
        self.store.write(&key, &record);

        tracing::debug!(
            calculator = calculator_id,
            count = record.calculations_this_month,
            "Recorded calculation"
        );
        emit_best_effort(
            self.events.as_ref(),
            CALCULATION_RECORDED_EVENT,
            &attrs([
                ("calculatorId", Value::from(calculator_id)),
                ("count", Value::from(record.calculations_this_month)),
                ("plan", Value::from(session.plan().as_str())),
            ]),
        );
        record
    }

    /// Runs `compute` if the session may, recording the calculation.
    ///
    /// Returns `None` without calling `compute` when access is denied or the
    /// quota is used up.
    pub fn perform_calculation<T, F>(
        &self,
        session: &Session,
        calculator_id: &str,
        compute: F,
    ) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(reason) = self.block_reason(session, calculator_id) {
            tracing::debug!(calculator = calculator_id, %reason, "Calculation blocked");
            emit_best_effort(
                self.events.as_ref(),
                CALCULATION_BLOCKED_EVENT,
                &attrs([
                    ("calculatorId", Value::from(calculator_id)),
                    ("reason", Value::from(reason.as_str())),
                    ("plan", Value::from(session.plan().as_str())),
                ]),
            );
            return None;
        }
        let result = compute();
        self.record_calculation(session, calculator_id);
        Some(result)
    }
}

impl fmt::Debug for SubscriptionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGate")
            .field("catalog", &self.catalog)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
