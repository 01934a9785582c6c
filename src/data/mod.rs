//! Data models for weekly surveillance observations.
//!
//! ## Submodules
//!
//! - [`table`]: cell values, time buckets, observation rows, and the
//!   [`Table`] container with its exact-match filters
//! - [`series`]: ordered numeric series extracted from one metric column
//!
//! ## Data Flow
//!
//! ```text
//! Table (normalized rows from the UI loader)
//!    │
//!    ├──▶ Table::series(metric) ──▶ MetricSeries (numeric columns)
//!    │
//!    └──▶ alarm::aggregate_resistance_rate() (categorical S/I/R columns)
//! ```

pub mod series;
pub mod table;

pub use series::{MetricSeries, SeriesPoint};
pub use table::{Observation, Table, TimeBucket, Value};
