//! Error types for the alarm engine.

use thiserror::Error;

/// Errors that can occur while evaluating a metric column.
///
/// All variants are local, recoverable conditions: each dashboard selection
/// is an independent computation, so the caller reports the error and moves
/// on to the next selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Fewer than two non-missing numeric values were available, so no
    /// statistical threshold can be computed. Distinct from "no alarms
    /// found": no alarm decision was possible at all.
    #[error("insufficient data: {found} numeric value(s), need at least 2")]
    InsufficientData { found: usize },

    /// The requested metric column is absent from the input table.
    #[error("unknown metric column: {0}")]
    UnknownMetric(String),
}
