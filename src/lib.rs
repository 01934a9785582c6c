//! # resistwatch
//!
//! Outlier alarm engine for antimicrobial resistance surveillance
//! dashboards.
//!
//! Given a table of weekly observations for one organism, the engine
//! computes an alarm threshold for a chosen metric column and flags the
//! weeks (or week/service pairs) that exceed it. Two policies exist: a
//! Tukey fence (Q3 + 1.5 × IQR) for ordinary metrics, and zero tolerance
//! for vancomycin-class resistance, where a single case is clinically
//! significant regardless of the statistical baseline.
//!
//! The UI layer owns file loading, column normalization, charting, and
//! navigation; this crate is the pure computation behind it. Every call
//! recomputes from its arguments and mutates nothing, so each dashboard
//! selection is an independent, retryable evaluation.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       UI collaborator                       │
//! │   loads spreadsheets ──▶ Table ──▶ Engine ──▶ AlarmReport  │
//! │                                      │            │         │
//! │                                      ▼            ▼         │
//! │                           data (series, rates)  chart/table │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: the tabular observation model — cell values with tolerant
//!   numeric coercion, week buckets, and ordered metric series
//! - **[`alarm`]**: the four core operations — policy selection, threshold
//!   computation, observation flagging, and resistance-rate aggregation
//! - **[`engine`]**: orchestration — one parameterized evaluation path in
//!   place of the dashboard's per-tab copies of the same math
//!
//! ## Evaluating a numeric metric column
//!
//! ```
//! use resistwatch::{Engine, Observation, Table, TimeBucket};
//!
//! let mut table = Table::new();
//! for (week, pct) in [(1, 4.0), (2, 5.0), (3, 3.5), (4, 21.0)] {
//!     table.push(Observation::new(TimeBucket::Week(week)).value("Oxacilline", pct));
//! }
//!
//! let report = Engine::new().evaluate(&table, "Oxacilline")?;
//! assert!(report.points[3].flagged); // week 4 is above the Tukey fence
//! assert!(!report.points[0].flagged);
//! # Ok::<(), resistwatch::EngineError>(())
//! ```
//!
//! ## Flagging resistance rates per service
//!
//! ```
//! use resistwatch::{Engine, Observation, Table, TimeBucket};
//!
//! let table = Table::from_rows(vec![
//!     Observation::new(TimeBucket::Week(1)).with_group("ICU").value("Oxacilline", "R"),
//!     Observation::new(TimeBucket::Week(1)).with_group("ICU").value("Oxacilline", "S"),
//!     Observation::new(TimeBucket::Week(1)).with_group("Surgery").value("Oxacilline", "R"),
//! ]);
//!
//! let rates = resistwatch::aggregate_resistance_rate(table.rows(), "Oxacilline", "R")?;
//! assert_eq!(rates[0].rate, 50.0);  // ICU: 1 of 2
//! assert_eq!(rates[1].rate, 100.0); // Surgery: 1 of 1
//! # Ok::<(), resistwatch::EngineError>(())
//! ```
//!
//! ## Using the operations directly
//!
//! ```
//! use resistwatch::{compute_threshold, flag_observations, select_policy, AlarmPolicy};
//!
//! let policy = select_policy("Vancomycin");
//! assert_eq!(policy, AlarmPolicy::ZeroTolerance);
//!
//! let values = vec![Some(0.0), Some(0.0), Some(1.0), None];
//! let threshold = compute_threshold(&values, policy)?;
//! assert_eq!(flag_observations(&values, &threshold), vec![false, false, true, false]);
//! # Ok::<(), resistwatch::EngineError>(())
//! ```

pub mod alarm;
pub mod data;
pub mod engine;
pub mod error;

// Re-export the main types for convenience
pub use alarm::{
    aggregate_resistance_rate, compute_threshold, flag_observations, select_policy, AlarmPolicy,
    PolicyConfig, ResistanceRate, Threshold,
};
pub use data::{MetricSeries, Observation, SeriesPoint, Table, TimeBucket, Value};
pub use engine::{AlarmPoint, AlarmReport, Engine, GroupingMode, ReportThreshold};
pub use error::EngineError;
