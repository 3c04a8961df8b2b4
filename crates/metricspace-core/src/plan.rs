//! Subscription plans and the static plan catalog.
//!
//! A [`Plan`] pairs a monthly [`Quota`] with the set of calculators it may
//! open. The catalog holds exactly one plan per [`PlanId`], so lookup is
//! total.
//!
//! # Usage
//!
//! ```rust
//! use metricspace_core::plan::{PlanCatalog, PlanId, Quota};
//!
//! let catalog = PlanCatalog::standard();
//! let free = catalog.plan(PlanId::Free);
//! assert_eq!(free.calculations_per_month, Quota::Count(5));
//! assert!(free.allows("velocity"));
//! assert!(!free.allows("utilization"));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calculator::Calculator;
use crate::error::Error;

const UNLIMITED: &str = "unlimited";
const ALL: &str = "all";

// ============================================================================
// PlanId
// ============================================================================

/// Identifier of a subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanId {
    /// Default tier; every unauthenticated session uses it.
    #[default]
    Free,
    /// Paid tier.
    Pro,
    /// Top tier.
    Enterprise,
}

impl PlanId {
    /// All plan ids, cheapest first.
    pub const ALL: [PlanId; 3] = [PlanId::Free, PlanId::Pro, PlanId::Enterprise];

    /// Upper-case label used in storage and analytics.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "FREE",
            PlanId::Pro => "PRO",
            PlanId::Enterprise => "ENTERPRISE",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownPlan { id: s.to_string() })
    }
}

// ============================================================================
// Quota
// ============================================================================

/// Monthly calculation allowance.
///
/// Serializes as a bare integer or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// At most this many calculations per billing period.
    Count(u32),
    /// No cap.
    Unlimited,
}

impl Quota {
    /// Returns `true` for [`Quota::Unlimited`].
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Quota::Unlimited)
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Count(n) => write!(f, "{n}"),
            Quota::Unlimited => f.write_str(UNLIMITED),
        }
    }
}

impl Serialize for Quota {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quota::Count(n) => serializer.serialize_u32(*n),
            Quota::Unlimited => serializer.serialize_str(UNLIMITED),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuotaRepr {
    Count(u32),
    Label(String),
}

impl<'de> Deserialize<'de> for Quota {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match QuotaRepr::deserialize(deserializer)? {
            QuotaRepr::Count(n) => Ok(Quota::Count(n)),
            QuotaRepr::Label(s) if s == UNLIMITED => Ok(Quota::Unlimited),
            QuotaRepr::Label(s) => Err(D::Error::custom(format!(
                "invalid quota '{s}', expected an integer or \"{UNLIMITED}\""
            ))),
        }
    }
}

// ============================================================================
// AllowedCalculators
// ============================================================================

/// Calculators a plan may open.
///
/// Serializes as the string `"all"` or an array of calculator ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedCalculators {
    /// Every id, including ids not in the calculator catalog.
    All,
    /// Only the listed ids.
    Only(BTreeSet<String>),
}

impl AllowedCalculators {
    /// Builds an [`AllowedCalculators::Only`] set from calculators.
    pub fn only<I: IntoIterator<Item = Calculator>>(calculators: I) -> Self {
        AllowedCalculators::Only(
            calculators
                .into_iter()
                .map(|c| c.id().to_string())
                .collect(),
        )
    }

    /// Returns `true` if `calculator_id` is admitted.
    pub fn contains(&self, calculator_id: &str) -> bool {
        match self {
            AllowedCalculators::All => true,
            AllowedCalculators::Only(ids) => ids.contains(calculator_id),
        }
    }
}

impl Serialize for AllowedCalculators {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AllowedCalculators::All => serializer.serialize_str(ALL),
            AllowedCalculators::Only(ids) => ids.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AllowedRepr {
    Only(BTreeSet<String>),
    Label(String),
}

impl<'de> Deserialize<'de> for AllowedCalculators {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AllowedRepr::deserialize(deserializer)? {
            AllowedRepr::Only(ids) => Ok(AllowedCalculators::Only(ids)),
            AllowedRepr::Label(s) if s == ALL => Ok(AllowedCalculators::All),
            AllowedRepr::Label(s) => Err(D::Error::custom(format!(
                "invalid calculator set '{s}', expected an array or \"{ALL}\""
            ))),
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// A subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Which tier this is.
    pub id: PlanId,
    /// Monthly calculation allowance.
    pub calculations_per_month: Quota,
    /// Calculators this plan may open.
    pub allowed_calculators: AllowedCalculators,
}

impl Plan {
    /// Returns `true` if this plan may open `calculator_id`.
    pub fn allows(&self, calculator_id: &str) -> bool {
        self.allowed_calculators.contains(calculator_id)
    }
}

// ============================================================================
// PlanCatalog
// ============================================================================

/// The fixed set of plans, one per [`PlanId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    free: Plan,
    pro: Plan,
    enterprise: Plan,
}

impl PlanCatalog {
    /// The production catalog.
    pub fn standard() -> Self {
        Self {
            free: Plan {
                id: PlanId::Free,
                calculations_per_month: Quota::Count(5),
                allowed_calculators: AllowedCalculators::only([
                    Calculator::Velocity,
                    Calculator::Throughput,
                ]),
            },
            pro: Plan {
                id: PlanId::Pro,
                calculations_per_month: Quota::Count(100),
                allowed_calculators: AllowedCalculators::only([
                    Calculator::Velocity,
                    Calculator::Throughput,
                    Calculator::FlowEfficiency,
                    Calculator::EstimateAccuracy,
                ]),
            },
            enterprise: Plan {
                id: PlanId::Enterprise,
                calculations_per_month: Quota::Unlimited,
                allowed_calculators: AllowedCalculators::All,
            },
        }
    }

    /// Replaces the plan stored under `plan.id`.
    pub fn with_plan(mut self, plan: Plan) -> Self {
        match plan.id {
            PlanId::Free => self.free = plan,
            PlanId::Pro => self.pro = plan,
            PlanId::Enterprise => self.enterprise = plan,
        }
        self
    }

    /// Looks up a plan.
    pub fn plan(&self, id: PlanId) -> &Plan {
        match id {
            PlanId::Free => &self.free,
            PlanId::Pro => &self.pro,
            PlanId::Enterprise => &self.enterprise,
        }
    }

    /// All plans, cheapest first.
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        PlanId::ALL.into_iter().map(|id| self.plan(id))
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Tests
// ============================================================================
