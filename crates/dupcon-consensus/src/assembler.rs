//! Turning one duplicate group into one consensus read.
//!
//! [`ConsensusAssembler::build`] decides how a group is handled:
//!
//! 1. Groups of one member, or whose first member is unmapped, are copied through
//!    ([`ConsensusOutcome::Supplementary`]).
//! 2. Groups where any member has an insertion or deletion go through the
//!    [`IndelReconciler`]. If the indels cannot be reconciled the best member (most aligned
//!    bases, then highest mean quality) is copied ([`ConsensusOutcome::IndelFail`]).
//! 3. Otherwise the most common CIGAR (fewest soft-clipped bases on ties) picks a template
//!    member, and every template column is voted across all members
//!    ([`ConsensusOutcome::AlignmentOnly`]).
//!
//! The consensus read takes its name from the first member with the last name token
//! replaced by the prefixed group id, the maximum mapping quality of the group, a mate
//! voted across members, and all other flags and attributes from the first member with
//! the duplicate flag cleared.

use std::sync::Arc;

use log::{debug, warn};
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;

use dupcon_metrics::{ConsensusOutcome, ConsensusStatistics};

use crate::base_caller::ColumnObservations;
use crate::cigar::{cigar_to_string, has_valid_shape, read_length, soft_clipped_bases};
use crate::cursor::ReadCursor;
use crate::fragment::{ConsensusRead, Fragment, MateInfo};
use crate::indel::{IndelReconciler, observe};
use crate::reference::{ReferenceBases, reference_base};
use crate::state::{ConsensusColumns, ConsensusState};

/// Options for building consensus reads.
#[derive(Debug, Clone)]
pub struct ConsensusOptions {
    /// Use at most this many members of a group, in input order
    pub max_read_depth: Option<usize>,

    /// Check each synthesized read for internal consistency and log failures
    pub validate: bool,

    /// Prefix placed before the group id in consensus read names
    pub read_name_prefix: String,

    /// Separator between read name tokens
    pub name_delimiter: char,
}

impl Default for ConsensusOptions {
    fn default() -> Self {
        Self {
            max_read_depth: None,
            validate: false,
            read_name_prefix: "CNS_".to_string(),
            name_delimiter: ':',
        }
    }
}

/// Builds consensus reads group by group, accumulating statistics.
///
/// Each worker owns its own assembler; statistics are merged by the caller.
pub struct ConsensusAssembler {
    reference: Arc<dyn ReferenceBases>,
    options: ConsensusOptions,
    stats: ConsensusStatistics,
}

impl ConsensusAssembler {
    #[must_use]
    pub fn new(reference: Arc<dyn ReferenceBases>, options: ConsensusOptions) -> Self {
        Self { reference, options, stats: ConsensusStatistics::new() }
    }

    #[must_use]
    pub fn options(&self) -> &ConsensusOptions {
        &self.options
    }

    #[must_use]
    pub fn statistics(&self) -> &ConsensusStatistics {
        &self.stats
    }

    /// Returns the accumulated statistics, leaving empty ones behind.
    pub fn take_statistics(&mut self) -> ConsensusStatistics {
        std::mem::take(&mut self.stats)
    }

    /// Name for a consensus read derived from `original`.
    ///
    /// `A:B:UMI` becomes `A:B:<prefix><group_id>`; a name without the delimiter is replaced
    /// entirely by `<prefix><group_id>`.
    #[must_use]
    pub fn consensus_name(&self, original: &str, group_id: &str) -> String {
        let prefix = &self.options.read_name_prefix;
        let delimiter = self.options.name_delimiter;
        match original.rsplit_once(delimiter) {
            Some((head, _)) => format!("{head}{delimiter}{prefix}{group_id}"),
            None => format!("{prefix}{group_id}"),
        }
    }

    /// Builds the consensus read for one group.
    ///
    /// Returns `None` only for an empty group. Never fails otherwise: irreconcilable groups
    /// degrade to a verbatim copy of one member.
    pub fn build(
        &mut self,
        fragments: &[&Fragment],
        group_id: &str,
    ) -> Option<(ConsensusRead, ConsensusOutcome)> {
        let members = match self.options.max_read_depth {
            Some(max) if fragments.len() > max => &fragments[..max],
            _ => fragments,
        };
        let first = *members.first()?;
        let read_count = members.len();
        let name = self.consensus_name(first.name(), group_id);

        if read_count == 1 || first.is_unmapped() {
            let read = ConsensusRead::copy_of(first, name, group_id, read_count);
            return Some(self.finish_group(read, ConsensusOutcome::Supplementary, members));
        }

        let mapped: Vec<&Fragment> = members.iter().copied().filter(|f| !f.is_unmapped()).collect();

        let columns = if mapped.iter().any(|f| f.has_indel()) {
            let mut state = ConsensusState::new(&mapped);
            let outcome = IndelReconciler::new(self.reference.as_ref()).reconcile(&mapped, &mut state);
            if outcome == ConsensusOutcome::IndelFail {
                let best = select_best_member(&mapped).unwrap_or(first);
                debug!(
                    "Group {group_id} with {read_count} reads fell back to a copy of {}",
                    best.name()
                );
                let read = ConsensusRead::copy_of(best, name, group_id, read_count);
                return Some(self.finish_group(read, outcome, members));
            }
            state.finish()
        } else {
            self.call_alignment_only(&mapped, first)
        };

        if columns.dual_strand {
            self.stats.record_dual_strand(read_count, columns.dual_strand_mismatches);
        }

        let outcome = columns.outcome;
        let mut flags = first.flags();
        flags.remove(Flags::DUPLICATE);
        let read = ConsensusRead {
            name,
            flags,
            chromosome: first.chromosome().to_string(),
            alignment_start: columns.alignment_start.unwrap_or(first.alignment_start()),
            mapping_quality: columns.mapping_quality,
            cigar: columns.cigar,
            bases: columns.bases,
            quals: columns.quals,
            mate: vote_mate(members),
            template_length: first.template_length(),
            data: first.data().clone(),
            group_id: group_id.to_string(),
            read_count,
            num_mutations: columns.num_mutations,
        };

        if self.options.validate {
            self.validate(&read, members);
        }
        Some(self.finish_group(read, outcome, members))
    }

    fn finish_group(
        &mut self,
        read: ConsensusRead,
        outcome: ConsensusOutcome,
        members: &[&Fragment],
    ) -> (ConsensusRead, ConsensusOutcome) {
        self.stats.record_group(outcome, members.len());
        (read, outcome)
    }

    /// Votes every column of the majority-CIGAR template across all members.
    fn call_alignment_only(&self, mapped: &[&Fragment], first: &Fragment) -> ConsensusColumns {
        let template = select_template(mapped).unwrap_or(first);
        let mut state = ConsensusState::new(mapped);
        state.set_outcome(ConsensusOutcome::AlignmentOnly);

        let direction = state.direction();
        let dual_strand = state.is_dual_strand();
        let chromosome = state.chromosome().to_string();
        let mut template_cursor = ReadCursor::new(template, direction);
        let mut cursors: Vec<ReadCursor<'_>> =
            mapped.iter().map(|f| ReadCursor::new(f, direction)).collect();
        let mut column = ColumnObservations::new();

        while let Some(kind) = template_cursor.current_kind() {
            let position = template_cursor.position();
            if matches!(kind, Kind::Deletion | Kind::Skip) {
                state.push_column(kind, position, None, None);
            } else {
                column.reset();
                for cursor in &mut cursors {
                    cursor.advance_to(position);
                    if !cursor.is_exhausted() && cursor.position() == position {
                        observe(cursor, &mut column);
                    }
                }
                let ref_base = reference_base(self.reference.as_ref(), &chromosome, position);
                state.push_column(kind, position, Some(column.call(dual_strand, ref_base)), ref_base);
            }
            template_cursor.advance();
        }

        state.finish()
    }

    /// Checks lengths and CIGAR shape, logging a member dump on failure.
    fn validate(&mut self, read: &ConsensusRead, members: &[&Fragment]) {
        let mut problems = Vec::new();
        if read.bases.len() != read.quals.len() {
            problems.push(format!(
                "{} bases but {} qualities",
                read.bases.len(),
                read.quals.len()
            ));
        }
        let cigar_len = read_length(&read.cigar);
        if read.bases.len() != cigar_len {
            problems.push(format!("{} bases but CIGAR consumes {cigar_len}", read.bases.len()));
        }
        if !has_valid_shape(&read.cigar) {
            problems.push(format!("invalid CIGAR shape {}", cigar_to_string(&read.cigar)));
        }
        if problems.is_empty() {
            return;
        }

        self.stats.record_validation_failure();
        warn!("Consensus read {} failed validation: {}", read.name, problems.join("; "));
        for member in members {
            warn!(
                "  member {} flags={:?} {}:{} cigar={} bases={} quals={}",
                member.name(),
                member.flags(),
                member.chromosome(),
                member.alignment_start(),
                cigar_to_string(member.cigar()),
                member.bases().len(),
                member.quals().len()
            );
        }
    }
}

/// The member with the most aligned bases, then the highest mean quality, then first seen.
#[must_use]
pub fn select_best_member<'f>(members: &[&'f Fragment]) -> Option<&'f Fragment> {
    let mut best: Option<&'f Fragment> = None;
    for &candidate in members {
        best = match best {
            None => Some(candidate),
            Some(current) => {
                let (a, b) = (candidate.aligned_base_count(), current.aligned_base_count());
                let better =
                    a > b || (a == b && candidate.mean_base_quality() > current.mean_base_quality());
                Some(if better { candidate } else { current })
            }
        };
    }
    best
}

/// Counts distinct values in first-seen order.
fn tally<'a, T: PartialEq + ?Sized>(values: impl Iterator<Item = &'a T>) -> Vec<(&'a T, usize)> {
    let mut counts: Vec<(&'a T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

/// Picks the most frequent entry; ties go to the lowest `penalty`, then first seen.
fn vote<'a, T: ?Sized>(counts: &[(&'a T, usize)], penalty: impl Fn(&T) -> usize) -> Option<&'a T> {
    let mut winner: Option<(&'a T, usize)> = None;
    for &(value, n) in counts {
        winner = match winner {
            Some((best, best_n))
                if n < best_n || (n == best_n && penalty(value) >= penalty(best)) =>
            {
                Some((best, best_n))
            }
            _ => Some((value, n)),
        };
    }
    winner.map(|(value, _)| value)
}

/// The member carrying the majority CIGAR with the smallest alignment start.
///
/// CIGAR ties are broken by fewest soft-clipped bases, then first seen.
#[must_use]
pub fn select_template<'f>(members: &[&'f Fragment]) -> Option<&'f Fragment> {
    let counts = tally(members.iter().map(|f| f.cigar()));
    let cigar: &[Op] = vote(&counts, soft_clipped_bases)?;
    members.iter().copied().filter(|f| f.cigar() == cigar).min_by_key(|f| f.alignment_start())
}

/// Mate metadata voted across members as one tuple.
///
/// Ties are broken by fewest soft-clipped bases in the mate CIGAR, then first seen.
#[must_use]
pub fn vote_mate(members: &[&Fragment]) -> Option<MateInfo> {
    let counts = tally(members.iter().filter_map(|f| f.mate()));
    vote(&counts, MateInfo::soft_clipped_bases).cloned()
}
