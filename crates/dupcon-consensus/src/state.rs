//! Per-group scratch state filled column by column while building a consensus.

use log::trace;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;

use dupcon_metrics::ConsensusOutcome;

use crate::base_caller::ColumnCall;
use crate::cigar::{is_aligned, push_op};
use crate::cursor::Direction;
use crate::fragment::Fragment;

/// Mutable accumulator for one duplicate group.
///
/// Created fresh for each group, written by the column loop in traversal order, and
/// consumed once by [`ConsensusState::finish`]. Never shared between threads.
#[derive(Debug, Clone)]
pub struct ConsensusState {
    direction: Direction,
    chromosome: String,
    min_aligned_start: i64,
    max_aligned_end: i64,
    min_padded_start: i64,
    max_padded_end: i64,
    mapping_quality: u8,
    dual_strand: bool,
    bases: Vec<u8>,
    quals: Vec<u8>,
    cigar: Vec<Op>,
    alignment_start: Option<i64>,
    num_mutations: usize,
    dual_strand_mismatches: usize,
    outcome: ConsensusOutcome,
}

/// Columns produced for a group, in reference (left-to-right) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusColumns {
    pub bases: Vec<u8>,
    pub quals: Vec<u8>,
    pub cigar: Vec<Op>,
    /// Leftmost aligned column; `None` if no column was aligned
    pub alignment_start: Option<i64>,
    pub mapping_quality: u8,
    pub num_mutations: usize,
    pub dual_strand: bool,
    pub dual_strand_mismatches: usize,
    pub outcome: ConsensusOutcome,
}

impl ConsensusState {
    /// Initializes state from the group's mapped members.
    ///
    /// Orientation comes from the first member; bounds and mapping quality span all members.
    #[must_use]
    pub fn new(members: &[&Fragment]) -> Self {
        let direction = members.first().map_or(Direction::Forward, |f| Direction::of(f));
        let chromosome = members.first().map(|f| f.chromosome().to_string()).unwrap_or_default();

        let has_first = members.iter().any(|f| f.is_first_of_pair());
        let has_other = members.iter().any(|f| !f.is_first_of_pair());

        Self {
            direction,
            chromosome,
            min_aligned_start: members.iter().map(|f| f.alignment_start()).min().unwrap_or(0),
            max_aligned_end: members.iter().map(|f| f.alignment_end()).max().unwrap_or(0),
            min_padded_start: members.iter().map(|f| f.padded_start()).min().unwrap_or(0),
            max_padded_end: members.iter().map(|f| f.padded_end()).max().unwrap_or(0),
            mapping_quality: members.iter().map(|f| f.mapping_quality()).max().unwrap_or(0),
            dual_strand: has_first && has_other,
            bases: Vec::new(),
            quals: Vec::new(),
            cigar: Vec::new(),
            alignment_start: None,
            num_mutations: 0,
            dual_strand_mismatches: 0,
            outcome: ConsensusOutcome::Unset,
        }
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    #[must_use]
    pub fn min_aligned_start(&self) -> i64 {
        self.min_aligned_start
    }

    #[must_use]
    pub fn max_aligned_end(&self) -> i64 {
        self.max_aligned_end
    }

    /// First column in the traversal direction, counting soft clips and edge insertions.
    #[must_use]
    pub fn frame_start(&self) -> i64 {
        match self.direction {
            Direction::Forward => self.min_padded_start,
            Direction::Reverse => self.max_padded_end,
        }
    }

    /// True if `position` lies within the span aligned by at least one member.
    #[must_use]
    pub fn is_within_alignment(&self, position: i64) -> bool {
        (self.min_aligned_start..=self.max_aligned_end).contains(&position)
    }

    /// True if the group holds both first- and second-of-pair reads.
    #[must_use]
    pub fn is_dual_strand(&self) -> bool {
        self.dual_strand
    }

    #[must_use]
    pub fn outcome(&self) -> ConsensusOutcome {
        self.outcome
    }

    /// Moves the state to a terminal outcome. Returns `false` if one was already set.
    pub fn set_outcome(&mut self, outcome: ConsensusOutcome) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = outcome;
        true
    }

    /// Columns emitted so far.
    #[must_use]
    pub fn cigar(&self) -> &[Op] {
        &self.cigar
    }

    /// Appends one column at reference `position`.
    ///
    /// `call` is `None` for deletion columns. `ref_base` is only used for mutation counting
    /// on aligned columns.
    pub fn push_column(
        &mut self,
        kind: Kind,
        position: i64,
        call: Option<ColumnCall>,
        ref_base: Option<u8>,
    ) {
        push_op(&mut self.cigar, kind);

        match kind {
            Kind::Insertion | Kind::Deletion => self.num_mutations += 1,
            k if is_aligned(k) => {
                self.alignment_start =
                    Some(self.alignment_start.map_or(position, |s| s.min(position)));
                if let (Some(call), Some(r)) = (call, ref_base) {
                    if call.base != r {
                        self.num_mutations += 1;
                    }
                }
            }
            _ => {}
        }

        if let Some(call) = call {
            self.bases.push(call.base);
            self.quals.push(call.quality);
            if call.strand_mismatch {
                self.dual_strand_mismatches += 1;
                trace!(
                    "Dual-strand mismatch at {}:{position}, called {} Q{}",
                    self.chromosome,
                    char::from(call.base),
                    call.quality
                );
            }
        }
    }

    /// Consumes the state, returning columns in reference order.
    #[must_use]
    pub fn finish(self) -> ConsensusColumns {
        let mut columns = ConsensusColumns {
            bases: self.bases,
            quals: self.quals,
            cigar: self.cigar,
            alignment_start: self.alignment_start,
            mapping_quality: self.mapping_quality,
            num_mutations: self.num_mutations,
            dual_strand: self.dual_strand,
            dual_strand_mismatches: self.dual_strand_mismatches,
            outcome: self.outcome,
        };
        if self.direction == Direction::Reverse {
            columns.bases.reverse();
            columns.quals.reverse();
            columns.cigar.reverse();
        }
        columns
    }
}
