//! Metricspace Core: plans, calculators, usage records, and event sinks.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`plan`]: Plan ids, quotas, and the plan catalog
//! - [`calculator`]: Calculator catalog, storage keys, and formulas
//! - [`usage`]: Monthly usage counters
//! - [`period`]: Billing-period rollover policies
//! - [`events`]: Analytics event sinks
//! - [`clock`]: Time sources

#![doc = include_str!("../README.md")]

pub mod calculator;
pub mod clock;
pub mod error;
pub mod events;
pub mod period;
pub mod plan;
pub mod usage;

#[cfg(test)]
mod proptests;

// Re-export key types at crate root for convenience
pub use calculator::{Calculator, Row};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use events::{EventAttrs, EventSink, MemorySink, NullSink, TracingSink};
pub use period::{BillingPeriod, BillingPeriodKind, CalendarMonth, CalendarMonthAndYear};
pub use plan::{AllowedCalculators, Plan, PlanCatalog, PlanId, Quota};
pub use usage::UsageRecord;
