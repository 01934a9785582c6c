//! Alarm policies, thresholds, flags, and rate aggregation.
//!
//! ## Submodules
//!
//! - [`policy`]: which threshold rule applies to a metric name
//! - [`threshold`]: Tukey fence / zero-tolerance threshold computation
//! - [`flag`]: comparing observations against a computed threshold
//! - [`aggregate`]: rolling categorical results up into resistance rates

pub mod aggregate;
pub mod flag;
pub mod policy;
pub mod threshold;

pub use aggregate::{aggregate_resistance_rate, ResistanceRate};
pub use flag::flag_observations;
pub use policy::{select_policy, AlarmPolicy, PolicyConfig};
pub use threshold::{compute_threshold, Threshold};
