//! Mergeable counters describing consensus outcomes.
//!
//! Each worker accumulates its own [`ConsensusStatistics`]; the driver combines them
//! with [`ConsensusStatistics::merge`] once all groups are processed.

use crate::consensus::ConsensusMetrics;
use crate::outcome::ConsensusOutcome;

/// Statistics tracked while building consensus reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsensusStatistics {
    /// Duplicate groups processed
    pub groups: u64,
    /// Input reads across all groups, after any read-depth cap
    pub input_reads: u64,
    pub alignment_only: u64,
    pub indel_match: u64,
    pub indel_mismatch: u64,
    pub indel_fail: u64,
    pub supplementary: u64,
    /// Groups containing both first- and second-of-pair reads
    pub dual_strand_groups: u64,
    /// Dual-strand groups with at least one disagreeing column
    pub dual_strand_mismatch_groups: u64,
    /// Member reads of dual-strand groups with at least one disagreeing column
    pub dual_strand_mismatch_reads: u64,
    /// Columns at which the two strands disagreed
    pub dual_strand_mismatch_columns: u64,
    /// Consensus reads that failed post-hoc validation
    pub validation_failures: u64,
}

impl ConsensusStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished group with its outcome and member count.
    pub fn record_group(&mut self, outcome: ConsensusOutcome, reads: usize) {
        self.groups += 1;
        self.input_reads += reads as u64;
        match outcome {
            ConsensusOutcome::Unset => {}
            ConsensusOutcome::AlignmentOnly => self.alignment_only += 1,
            ConsensusOutcome::IndelMatch => self.indel_match += 1,
            ConsensusOutcome::IndelMismatch => self.indel_mismatch += 1,
            ConsensusOutcome::IndelFail => self.indel_fail += 1,
            ConsensusOutcome::Supplementary => self.supplementary += 1,
        }
    }

    /// Records a dual-strand group and how many of its columns disagreed between strands.
    pub fn record_dual_strand(&mut self, reads: usize, mismatched_columns: usize) {
        self.dual_strand_groups += 1;
        if mismatched_columns > 0 {
            self.dual_strand_mismatch_groups += 1;
            self.dual_strand_mismatch_reads += reads as u64;
            self.dual_strand_mismatch_columns += mismatched_columns as u64;
        }
    }

    pub fn record_validation_failure(&mut self) {
        self.validation_failures += 1;
    }

    /// Number of groups that ended with `outcome`.
    #[must_use]
    pub fn count(&self, outcome: ConsensusOutcome) -> u64 {
        match outcome {
            ConsensusOutcome::Unset => {
                self.groups - ConsensusOutcome::TERMINAL.iter().map(|o| self.count(*o)).sum::<u64>()
            }
            ConsensusOutcome::AlignmentOnly => self.alignment_only,
            ConsensusOutcome::IndelMatch => self.indel_match,
            ConsensusOutcome::IndelMismatch => self.indel_mismatch,
            ConsensusOutcome::IndelFail => self.indel_fail,
            ConsensusOutcome::Supplementary => self.supplementary,
        }
    }

    /// Groups whose outcome is valid.
    #[must_use]
    pub fn valid_groups(&self) -> u64 {
        self.groups - self.indel_fail
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups == 0
    }

    /// Merges statistics from another instance into this one.
    pub fn merge(&mut self, other: &ConsensusStatistics) {
        self.groups += other.groups;
        self.input_reads += other.input_reads;
        self.alignment_only += other.alignment_only;
        self.indel_match += other.indel_match;
        self.indel_mismatch += other.indel_mismatch;
        self.indel_fail += other.indel_fail;
        self.supplementary += other.supplementary;
        self.dual_strand_groups += other.dual_strand_groups;
        self.dual_strand_mismatch_groups += other.dual_strand_mismatch_groups;
        self.dual_strand_mismatch_reads += other.dual_strand_mismatch_reads;
        self.dual_strand_mismatch_columns += other.dual_strand_mismatch_columns;
        self.validation_failures += other.validation_failures;
    }

    /// Snapshot of these counters as a serializable metrics row.
    #[must_use]
    pub fn metrics(&self) -> ConsensusMetrics {
        let frac_valid_groups = if self.groups == 0 {
            0.0
        } else {
            #[expect(clippy::cast_precision_loss, reason = "group counts never exceed 2^53")]
            let frac = self.valid_groups() as f64 / self.groups as f64;
            frac
        };

        ConsensusMetrics {
            consensus_groups: self.groups,
            input_reads: self.input_reads,
            alignment_only: self.alignment_only,
            indel_match: self.indel_match,
            indel_mismatch: self.indel_mismatch,
            indel_fail: self.indel_fail,
            supplementary: self.supplementary,
            frac_valid_groups,
            dual_strand_groups: self.dual_strand_groups,
            dual_strand_mismatch_groups: self.dual_strand_mismatch_groups,
            dual_strand_mismatch_reads: self.dual_strand_mismatch_reads,
            dual_strand_mismatch_columns: self.dual_strand_mismatch_columns,
            validation_failures: self.validation_failures,
        }
    }
}
