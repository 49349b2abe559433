//! Metrics rows describing a consensus run.

use serde::{Deserialize, Serialize};

use crate::outcome::ConsensusOutcome;
use crate::{Metric, format_float};

/// A key-value-description metric row for vertical metrics output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusKvMetric {
    pub key: String,
    pub value: String,
    pub description: String,
}

impl ConsensusKvMetric {
    /// Creates a new key-value-description metric.
    #[must_use]
    pub fn new(key: impl Into<String>, value: String, description: impl Into<String>) -> Self {
        Self { key: key.into(), value, description: description.into() }
    }
}

/// Consensus outcome and dual-strand metrics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusMetrics {
    /// Total number of duplicate groups processed
    pub consensus_groups: u64,

    /// Total input reads considered
    pub input_reads: u64,

    /// Groups built without indels
    pub alignment_only: u64,

    /// Groups whose indels agreed across members
    pub indel_match: u64,

    /// Groups whose differing indels were reconciled
    pub indel_mismatch: u64,

    /// Groups that fell back to a verbatim copy
    pub indel_fail: u64,

    /// Groups copied through without voting
    pub supplementary: u64,

    /// Fraction of groups with a valid outcome
    pub frac_valid_groups: f64,

    /// Groups with reads from both strands of the pair
    pub dual_strand_groups: u64,

    /// Dual-strand groups with at least one disagreeing column
    pub dual_strand_mismatch_groups: u64,

    /// Reads in dual-strand groups with at least one disagreeing column
    pub dual_strand_mismatch_reads: u64,

    /// Columns where the two strands disagreed
    pub dual_strand_mismatch_columns: u64,

    /// Consensus reads that failed validation
    pub validation_failures: u64,
}

impl ConsensusMetrics {
    /// Number of groups with the given outcome.
    #[must_use]
    pub fn outcome_count(&self, outcome: ConsensusOutcome) -> u64 {
        match outcome {
            ConsensusOutcome::Unset => 0,
            ConsensusOutcome::AlignmentOnly => self.alignment_only,
            ConsensusOutcome::IndelMatch => self.indel_match,
            ConsensusOutcome::IndelMismatch => self.indel_mismatch,
            ConsensusOutcome::IndelFail => self.indel_fail,
            ConsensusOutcome::Supplementary => self.supplementary,
        }
    }

    /// Converts metrics to key-value-description rows.
    ///
    /// Outcome rows are always emitted; validation failures only when non-zero.
    #[must_use]
    pub fn to_kv_metrics(&self) -> Vec<ConsensusKvMetric> {
        let mut metrics = vec![
            ConsensusKvMetric::new(
                "consensus_groups",
                self.consensus_groups.to_string(),
                "Total duplicate groups processed",
            ),
            ConsensusKvMetric::new(
                "input_reads",
                self.input_reads.to_string(),
                "Total input reads considered for consensus",
            ),
        ];

        for outcome in ConsensusOutcome::TERMINAL {
            metrics.push(ConsensusKvMetric::new(
                outcome.key(),
                self.outcome_count(outcome).to_string(),
                outcome.description(),
            ));
        }

        #[rustfmt::skip]
        let rest = [
            ("frac_valid_groups", format_float(self.frac_valid_groups), "Fraction of groups with a valid consensus outcome"),
            ("dual_strand_groups", self.dual_strand_groups.to_string(), "Groups containing reads from both strands"),
            ("dual_strand_mismatch_groups", self.dual_strand_mismatch_groups.to_string(), "Dual-strand groups where the strands disagreed"),
            ("dual_strand_mismatch_reads", self.dual_strand_mismatch_reads.to_string(), "Reads in dual-strand groups where the strands disagreed"),
            ("dual_strand_mismatch_columns", self.dual_strand_mismatch_columns.to_string(), "Columns where the two strands disagreed"),
        ];
        for (key, value, description) in rest {
            metrics.push(ConsensusKvMetric::new(key, value, description));
        }

        if self.validation_failures > 0 {
            metrics.push(ConsensusKvMetric::new(
                "validation_failures",
                self.validation_failures.to_string(),
                "Consensus reads that failed post-hoc validation",
            ));
        }

        metrics
    }
}

impl Metric for ConsensusMetrics {
    fn metric_name() -> &'static str {
        "consensus"
    }
}
