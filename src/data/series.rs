//! Metric series extraction and numeric coercion.
//!
//! A [`MetricSeries`] is the ordered numeric view of one metric column,
//! aligned with the table's weeks. Missing and non-numeric cells survive as
//! `None` so the series keeps the same shape as the table it came from.

use serde::{Deserialize, Serialize};

use super::table::{Table, TimeBucket, Value};
use crate::error::EngineError;

/// One point of a metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub week: TimeBucket,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group: Option<String>,
    /// Coerced numeric value; `None` when the cell was missing or not numeric.
    pub value: Option<f64>,
}

/// The ordered-by-week numeric view of one metric column.
///
/// The caller's contract is at most one point per week (or per week/group
/// pair when grouped); the engine does not dedupe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Column name this series was extracted from.
    pub metric: String,
    /// Points sorted by `(week, group)`.
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    /// The values in series order, ready for threshold computation and
    /// flagging.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points that survived numeric coercion.
    pub fn numeric_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

impl Table {
    /// Extract the ordered series for one metric column.
    ///
    /// Cells are coerced to numbers ([`Value::as_number`]); rows that do not
    /// carry the column contribute a missing point, so the series stays
    /// aligned with the table's weeks. Returns
    /// [`EngineError::UnknownMetric`] when no row in the table carries the
    /// column at all.
    pub fn series(&self, metric: &str) -> Result<MetricSeries, EngineError> {
        if !self.has_metric(metric) {
            return Err(EngineError::UnknownMetric(metric.to_string()));
        }

        let mut points: Vec<SeriesPoint> = self
            .rows()
            .iter()
            .map(|row| SeriesPoint {
                week: row.week,
                group: row.group.clone(),
                value: row.get(metric).and_then(Value::as_number),
            })
            .collect();
        points.sort_by(|a, b| a.week.cmp(&b.week).then_with(|| a.group.cmp(&b.group)));

        Ok(MetricSeries {
            metric: metric.to_string(),
            points,
        })
    }
}
