//! Tabular observation model.
//!
//! The UI layer owns file loading and column normalization; what reaches the
//! engine is a [`Table`] of [`Observation`] rows, each keyed by a week bucket
//! and an optional group label (e.g. the requesting service) and carrying
//! named metric cells.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cell of a metric column.
///
/// Source data is manually curated, so a nominally numeric column may carry
/// blanks or typos. Anything that fails numeric coercion is treated as
/// missing, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A numeric value (resistance percentage, count, ...).
    Number(f64),
    /// A categorical value (susceptibility result "S"/"I"/"R", identifier, ...).
    Text(String),
    /// An empty cell.
    Missing,
}

impl Value {
    /// Coerce the cell to a number, treating failures as missing.
    ///
    /// Non-finite numbers are missing too: a NaN smuggled in by the loader
    /// must never reach the quantile computation.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) => None,
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Missing => None,
        }
    }

    /// The exact text of the cell, if it is categorical.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check whether the cell is empty.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// The time bucket of an observation: an ISO week number or a calendar date,
/// depending on how the source dataset encodes its week column.
///
/// A table should use a single variant throughout; ordering across variants
/// falls back to variant order (weeks before dates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    Week(u32),
    Date(NaiveDate),
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Week(w) => write!(f, "W{w:02}"),
            TimeBucket::Date(d) => write!(f, "{d}"),
        }
    }
}

/// One row of a dataset: a week bucket, an optional group label, and the
/// metric cells for that row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Time bucket this row belongs to.
    pub week: TimeBucket,
    /// Optional grouping key, e.g. the requesting service.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group: Option<String>,
    /// Metric cells keyed by column name.
    pub values: BTreeMap<String, Value>,
}

impl Observation {
    /// Create an empty observation for a week.
    pub fn new(week: TimeBucket) -> Self {
        Self {
            week,
            group: None,
            values: BTreeMap::new(),
        }
    }

    /// Attach a group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set a metric cell.
    pub fn value(mut self, metric: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(metric.into(), value.into());
        self
    }

    /// Look up a metric cell by column name.
    pub fn get(&self, metric: &str) -> Option<&Value> {
        self.values.get(metric)
    }
}

/// A loaded dataset, ready for evaluation.
///
/// Tables are snapshots: the engine never mutates one, and every derived
/// result (series, rates, reports) is returned as new values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Observation>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from pre-built rows.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    /// Append a row.
    pub fn push(&mut self, row: Observation) {
        self.rows.push(row);
    }

    /// The rows of the table, in insertion order.
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of metric column names across all rows, sorted.
    ///
    /// This is what the dashboard offers in its column selector.
    pub fn metric_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> =
            self.rows.iter().flat_map(|r| r.values.keys()).map(String::as_str).collect();
        names.into_iter().map(String::from).collect()
    }

    /// Check whether any row carries the column.
    pub fn has_metric(&self, metric: &str) -> bool {
        self.rows.iter().any(|r| r.values.contains_key(metric))
    }

    /// Rows whose `column` cell equals `text` exactly.
    ///
    /// Exact key equality on categorical columns is all the patient-lookup
    /// view needs: filter by service, then by patient identifier.
    pub fn filter_eq(&self, column: &str, text: &str) -> Table {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.get(column).and_then(Value::as_text) == Some(text))
            .cloned()
            .collect();
        Table { rows }
    }

    /// Rows belonging to `group`.
    pub fn filter_group(&self, group: &str) -> Table {
        let rows =
            self.rows.iter().filter(|r| r.group.as_deref() == Some(group)).cloned().collect();
        Table { rows }
    }
}
