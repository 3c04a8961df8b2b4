//! Per-calculator input rows.

use metricspace_core::calculator::validate_value;
use metricspace_core::{Calculator, Error, Result, Row};

use crate::store::PersistenceStore;

/// The ordered input rows of one calculator.
///
/// Always holds at least one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorState {
    calculator: Calculator,
    rows: Vec<Row>,
}

impl CalculatorState {
    /// A fresh state with a single empty row.
    pub fn new(calculator: Calculator) -> Self {
        Self {
            calculator,
            rows: vec![calculator.default_row()],
        }
    }

    /// Loads the rows stored under the calculator's storage key, or a fresh
    /// state if none are stored.
    pub fn load(store: &PersistenceStore, calculator: Calculator) -> Self {
        let rows: Vec<Row> = store.read(&calculator.storage_key(), Vec::new());
        if rows.is_empty() {
            return Self::new(calculator);
        }
        Self { calculator, rows }
    }

    /// Persists the rows under the calculator's storage key.
    pub fn save(&self, store: &PersistenceStore) {
        store.write(&self.calculator.storage_key(), &self.rows);
    }

    /// Which calculator these rows belong to.
    pub fn calculator(&self) -> Calculator {
        self.calculator
    }

    /// The rows, in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Appends an empty row and returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(self.calculator.default_row());
        self.rows.len() - 1
    }

    /// Removes the row at `index`.
    ///
    /// Returns `Ok(false)` without changing anything when it is the last
    /// remaining row.
    pub fn remove_row(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        if self.rows.len() == 1 {
            return Ok(false);
        }
        self.rows.remove(index);
        Ok(true)
    }

    /// Sets `field` of row `index` to `value`, which must be empty or
    /// numeric.
    pub fn update_field(&mut self, index: usize, field: &str, value: &str) -> Result<()> {
        self.check_index(index)?;
        if !self.calculator.fields().contains(&field) {
            return Err(Error::validation_field(
                field,
                format!("'{field}' is not a {} input", self.calculator.id()),
            ));
        }
        validate_value(field, value)?;
        self.rows[index].insert(field.to_string(), value.trim().to_string());
        Ok(())
    }

    /// Drops every row and starts over with a single empty row.
    pub fn reset(&mut self) {
        self.rows = vec![self.calculator.default_row()];
    }

    /// Runs the calculator's formula over the rows.
    pub fn compute(&self) -> Option<f64> {
        self.calculator.compute(&self.rows)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "row {index} does not exist ({} rows)",
                self.rows.len()
            )))
        }
    }
}
