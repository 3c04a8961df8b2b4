//! # metricspace-gate
//!
//! Subscription access control for Metricspace calculators.
//!
//! This crate implements:
//! - Session context with plan transitions
//! - Calculator access checks against the plan catalog
//! - Monthly quota checks with lazy billing-period rollover
//! - Usage recording through the persistence store
//! - Payment status handling

#![doc = include_str!("../README.md")]

pub mod error;
pub mod gate;
pub mod session;

pub use error::{Error, Result};
pub use gate::{
    BlockReason, CALCULATION_BLOCKED_EVENT, CALCULATION_RECORDED_EVENT, LimitStatus,
    SubscriptionGate,
};
pub use session::{PaymentOutcome, PaymentStatus, Session, USAGE_KEY_PREFIX, UserProfile};
