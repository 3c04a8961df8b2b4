//! Per-user session context: who is signed in and which plan applies.
//!
//! Sessions are plain values handed to every gate call. An anonymous session
//! is always on [`PlanId::Free`]; the plan only changes through
//! [`Session::upgrade`], [`Session::cancel`], or [`Session::apply_payment`].

use std::fmt;

use chrono::{DateTime, Utc};
use metricspace_core::PlanId;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Storage key prefix for usage records.
pub const USAGE_KEY_PREFIX: &str = "metricspace_usage_";

const ANONYMOUS: &str = "anonymous";

/// A user profile as returned by the profile service on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable user id.
    pub id: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    /// Subscribed plan.
    #[serde(default)]
    pub plan: PlanId,
    /// When the paid subscription lapses. Carried, never compared.
    #[serde(default)]
    pub subscription_expires: Option<DateTime<Utc>>,
    /// Calculation total as tracked by the remote service.
    #[serde(default)]
    pub calculations_count: u32,
}

impl UserProfile {
    /// Creates a profile with just an id and a plan.
    pub fn new(id: impl Into<String>, plan: PlanId) -> Self {
        Self {
            id: id.into(),
            email: String::new(),
            plan,
            subscription_expires: None,
            calculations_count: 0,
        }
    }

    /// Parses the profile service's JSON response.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json).map_err(|e| Error::profile(e.to_string()))?;
        if profile.id.trim().is_empty() {
            return Err(Error::profile("profile has an empty id"));
        }
        Ok(profile)
    }
}

/// Payment provider status, consumed opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Funds captured.
    Succeeded,
    /// Still processing.
    Pending,
    /// Anything else the provider reports.
    Other(String),
}

impl PaymentStatus {
    /// Maps a provider status string.
    pub fn parse(status: &str) -> Self {
        match status {
            "succeeded" => PaymentStatus::Succeeded,
            "pending" => PaymentStatus::Pending,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Succeeded => f.write_str("succeeded"),
            PaymentStatus::Pending => f.write_str("pending"),
            PaymentStatus::Other(s) => f.write_str(s),
        }
    }
}

/// What applying a payment did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The session moved to this plan.
    Upgraded(PlanId),
    /// Nothing changed yet; the provider is still processing.
    Pending,
}

/// Session context for gate operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserProfile>,
    plan: PlanId,
}

impl Session {
    /// A signed-out session on the free plan.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session on the profile's plan.
    pub fn login(profile: UserProfile) -> Self {
        tracing::info!(user = %profile.id, plan = %profile.plan, "Session started");
        Self {
            plan: profile.plan,
            user: Some(profile),
        }
    }

    /// Signs out, returning to the free plan.
    pub fn logout(&mut self) {
        *self = Self::anonymous();
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Returns `true` if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The plan currently in effect.
    pub fn plan(&self) -> PlanId {
        self.plan
    }

    /// Storage key of this session's usage record.
    pub fn usage_key(&self) -> String {
        let who = self.user.as_ref().map_or(ANONYMOUS, |u| u.id.as_str());
        format!("{USAGE_KEY_PREFIX}{who}")
    }

    /// Switches a signed-in user to `plan`.
    pub fn upgrade(&mut self, plan: PlanId) -> Result<()> {
        let user = self
            .user
            .as_mut()
            .ok_or_else(|| Error::not_authenticated("change plans"))?;
        tracing::info!(user = %user.id, from = %self.plan, to = %plan, "Plan changed");
        user.plan = plan;
        self.plan = plan;
        Ok(())
    }

    /// Drops a signed-in user back to the free plan.
    pub fn cancel(&mut self) -> Result<()> {
        self.upgrade(PlanId::Free)
    }

    /// Applies the payment provider's verdict for a purchase of `plan`.
    ///
    /// Succeeded upgrades the session, pending leaves it unchanged, and any
    /// other status is an error carrying the provider's status string.
    pub fn apply_payment(
        &mut self,
        plan: PlanId,
        status: &PaymentStatus,
    ) -> Result<PaymentOutcome> {
        if !self.is_authenticated() {
            return Err(Error::not_authenticated("purchase a plan"));
        }
        match status {
            PaymentStatus::Succeeded => {
                self.upgrade(plan)?;
                Ok(PaymentOutcome::Upgraded(plan))
            }
            PaymentStatus::Pending => Ok(PaymentOutcome::Pending),
            PaymentStatus::Other(s) => Err(Error::Payment { status: s.clone() }),
        }
    }
}
