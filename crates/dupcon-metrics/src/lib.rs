#![deny(unsafe_code)]

//! Consensus outcome classification, statistics and TSV metrics output.
//!
//! This crate provides:
//! - [`ConsensusOutcome`], the terminal classification of one duplicate group
//! - [`ConsensusStatistics`], mergeable per-worker counters
//! - [`Metric`] and the [`consensus`] metric rows written by the [`writer`] module

pub mod consensus;
pub mod outcome;
pub mod statistics;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use consensus::{ConsensusKvMetric, ConsensusMetrics};
pub use outcome::ConsensusOutcome;
pub use statistics::ConsensusStatistics;

/// Number of decimal places used for float metrics.
pub const FLOAT_PRECISION: usize = 6;

/// Formats a float value with the standard precision for metrics.
///
/// # Example
/// ```
/// use dupcon_metrics::format_float;
/// assert_eq!(format_float(0.9), "0.900000");
/// assert_eq!(format_float(0.0), "0.000000");
/// ```
#[must_use]
pub fn format_float(value: f64) -> String {
    format!("{value:.FLOAT_PRECISION$}")
}

/// Formats a count with thousands separators.
///
/// # Examples
///
/// ```
/// use dupcon_metrics::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(123), "123");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A metric type that can be serialized to TSV files.
pub trait Metric: Serialize + for<'de> Deserialize<'de> + Clone + Default {
    /// Human-readable name for this metric type, used in error messages.
    fn metric_name() -> &'static str;
}
