//! Calculator catalog and formulas.
//!
//! Every calculator reads two numeric fields per input row, turns each usable
//! row into one value, and averages those values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One input row: field name mapped to a numeric-or-empty string.
pub type Row = BTreeMap<String, String>;

/// How a row's two fields combine into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Formula {
    /// `a / b`
    Ratio,
    /// `a / b * 100`
    Percentage,
    /// `(b - a) / a * 100`
    PercentDifference,
}

impl Formula {
    fn apply(self, a: f64, b: f64) -> Option<f64> {
        let value = match self {
            Formula::Ratio if b != 0.0 => a / b,
            Formula::Percentage if b != 0.0 => a / b * 100.0,
            Formula::PercentDifference if a != 0.0 => (b - a) / a * 100.0,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// The calculators offered by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Calculator {
    /// Story points normalized by focus factor.
    Velocity,
    /// Items completed per day.
    Throughput,
    /// Share of elapsed time spent actively working.
    FlowEfficiency,
    /// Percentage difference between estimate and actual.
    EstimateAccuracy,
    /// Hours worked as a share of hours available.
    Utilization,
}

impl Calculator {
    /// Every calculator in the catalog.
    pub const ALL: [Calculator; 5] = [
        Calculator::Velocity,
        Calculator::Throughput,
        Calculator::FlowEfficiency,
        Calculator::EstimateAccuracy,
        Calculator::Utilization,
    ];

    /// Stable identifier used by plans and the gate.
    pub fn id(&self) -> &'static str {
        match self {
            Calculator::Velocity => "velocity",
            Calculator::Throughput => "throughput",
            Calculator::FlowEfficiency => "flow-efficiency",
            Calculator::EstimateAccuracy => "estimate-accuracy",
            Calculator::Utilization => "utilization",
        }
    }

    /// Human-readable name.
    pub fn title(&self) -> &'static str {
        match self {
            Calculator::Velocity => "Velocity",
            Calculator::Throughput => "Throughput",
            Calculator::FlowEfficiency => "Flow Efficiency",
            Calculator::EstimateAccuracy => "Estimate Accuracy",
            Calculator::Utilization => "Utilization",
        }
    }

    /// Storage key for this calculator's input rows.
    ///
    /// ```rust
    /// use metricspace_core::Calculator;
    ///
    /// assert_eq!(Calculator::Velocity.storage_key(), "metricspace_velocity_data");
    /// assert_eq!(
    ///     Calculator::FlowEfficiency.storage_key(),
    ///     "metricspace_flow_efficiency_data"
    /// );
    /// ```
    pub fn storage_key(&self) -> String {
        format!("metricspace_{}_data", self.id().replace('-', "_"))
    }

    /// The two input fields, in formula order.
    pub fn fields(&self) -> [&'static str; 2] {
        match self {
            Calculator::Velocity => ["storyPoints", "focusFactor"],
            Calculator::Throughput => ["itemsCompleted", "days"],
            Calculator::FlowEfficiency => ["activeTime", "totalTime"],
            Calculator::EstimateAccuracy => ["estimated", "actual"],
            Calculator::Utilization => ["hoursWorked", "hoursAvailable"],
        }
    }

    /// A row with every field empty.
    pub fn default_row(&self) -> Row {
        self.fields()
            .iter()
            .map(|f| (f.to_string(), String::new()))
            .collect()
    }

    fn formula(&self) -> Formula {
        match self {
            Calculator::Velocity | Calculator::Throughput => Formula::Ratio,
            Calculator::FlowEfficiency | Calculator::Utilization => Formula::Percentage,
            Calculator::EstimateAccuracy => Formula::PercentDifference,
        }
    }

    /// Value of a single row, or `None` if the row is incomplete or divides
    /// by zero.
    pub fn row_value(&self, row: &Row) -> Option<f64> {
        let [a, b] = self.fields();
        self.formula()
            .apply(parse_field(row, a)?, parse_field(row, b)?)
    }

    /// Per-row values for every usable row, in row order.
    pub fn series(&self, rows: &[Row]) -> Vec<f64> {
        rows.iter().filter_map(|row| self.row_value(row)).collect()
    }

    /// Mean of the usable rows, or `None` if no row is usable.
    pub fn compute(&self, rows: &[Row]) -> Option<f64> {
        let values = self.series(rows);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl fmt::Display for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Calculator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Calculator::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| Error::UnknownCalculator { id: s.to_string() })
    }
}

fn parse_field(row: &Row, field: &str) -> Option<f64> {
    let raw = row.get(field)?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Checks that `value` is empty or a finite number.
pub fn validate_value(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(Error::validation_field(
            field,
            format!("'{value}' is not a number"),
        )),
    }
}
