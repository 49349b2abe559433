//! Formatting helpers and summary logging for consensus runs.

use std::time::{Duration, Instant};

use dupcon_metrics::{ConsensusOutcome, ConsensusStatistics, format_count};

/// Formats a fraction as a percentage with `decimals` decimal places.
///
/// # Examples
///
/// ```
/// use dupcon_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration in human-readable form (e.g. "45s", "2m 15s", "1h 30m").
///
/// # Examples
///
/// ```
/// use dupcon_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a throughput, falling back to per-minute below one item per second.
#[must_use]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} groups/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} groups/s", format_count(rate as u64))
    } else {
        format!("{:.1} groups/min", count as f64 / (secs / 60.0))
    }
}

/// Logs an `info`-level summary of consensus statistics.
///
/// # Examples
///
/// ```no_run
/// use dupcon_lib::logging::log_consensus_summary;
/// use dupcon_metrics::{ConsensusOutcome, ConsensusStatistics};
///
/// let mut stats = ConsensusStatistics::new();
/// stats.record_group(ConsensusOutcome::AlignmentOnly, 3);
/// log_consensus_summary(&stats);
/// ```
pub fn log_consensus_summary(stats: &ConsensusStatistics) {
    log::info!("Consensus Summary:");
    log::info!("  Duplicate groups: {}", format_count(stats.groups));
    log::info!("  Input reads: {}", format_count(stats.input_reads));

    if stats.groups == 0 {
        return;
    }

    let groups = stats.groups as f64;
    for outcome in ConsensusOutcome::TERMINAL {
        let count = stats.count(outcome);
        if count > 0 {
            log::info!(
                "  {}: {} ({})",
                outcome.description(),
                format_count(count),
                format_percent(count as f64 / groups, 2)
            );
        }
    }

    if stats.dual_strand_groups > 0 {
        log::info!(
            "  Dual-strand groups: {} ({} with strand disagreement over {} columns)",
            format_count(stats.dual_strand_groups),
            format_count(stats.dual_strand_mismatch_groups),
            format_count(stats.dual_strand_mismatch_columns)
        );
    }

    if stats.validation_failures > 0 {
        log::warn!(
            "  {} consensus reads failed validation",
            format_count(stats.validation_failures)
        );
    }
}

/// Times an operation and logs its start and completion.
///
/// # Examples
///
/// ```no_run
/// use dupcon_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Calling consensus");
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Starts the timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Logs completion with the number of groups processed and the rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} groups in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.9543, 2), "95.43%");
        assert_eq!(format_percent(0.5, 1), "50.0%");
        assert_eq!(format_percent(0.0, 2), "0.00%");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(format_duration(Duration::from_secs(5400)), "1h 30m");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1000, Duration::from_secs(1)), "1,000 groups/s");
        assert_eq!(format_rate(30, Duration::from_secs(60)), "30.0 groups/min");
        assert!(format_rate(1000, Duration::from_nanos(1)).contains("groups/s"));
    }

    #[test]
    fn test_log_consensus_summary() {
        log_consensus_summary(&ConsensusStatistics::new());

        let mut stats = ConsensusStatistics::new();
        stats.record_group(ConsensusOutcome::AlignmentOnly, 4);
        stats.record_group(ConsensusOutcome::IndelFail, 2);
        stats.record_dual_strand(4, 1);
        stats.record_validation_failure();
        log_consensus_summary(&stats);
    }

    #[test]
    fn test_operation_timer() {
        OperationTimer::new("Test").log_completion(10);
    }
}
