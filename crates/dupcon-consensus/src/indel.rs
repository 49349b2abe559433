//! Building a shared coordinate frame for groups whose members carry indels.
//!
//! All members are walked together, one reference column at a time, starting from the
//! group's outermost soft-clipped or edge-inserted base in the traversal direction. At each position the
//! *active* members are those whose cursor has reached the position and is not exhausted.
//!
//! - If a strict majority of active members sit in an insertion, one inserted column is
//!   voted from them; this repeats while a strict majority remain in insertion. Minority
//!   insertions are then skipped.
//! - If a strict majority sit in a deletion, a deletion column is emitted.
//! - Otherwise the bases of all non-deleting active members are voted, as an aligned
//!   column inside the group's aligned span. Outside it the column is inserted when a
//!   strict majority of active members hold an edge insertion there, and soft-clipped
//!   otherwise.
//!
//! Edge insertions (before the first or after the last aligned base) are laid out on the
//! reference axis like soft clips, so a base one member soft-clips and another member
//! inserts at the read end is voted once.
//!
//! An exact tie between members with and without an insertion (or deletion), a position
//! with no active member while others remain, or a finished alignment of invalid shape
//! means the placements cannot be reconciled and the outcome is
//! [`ConsensusOutcome::IndelFail`].

use log::debug;
use noodles::sam::alignment::record::cigar::op::Kind;

use dupcon_metrics::ConsensusOutcome;

use crate::base_caller::ColumnObservations;
use crate::cigar::has_valid_shape;
use crate::cursor::ReadCursor;
use crate::fragment::Fragment;
use crate::reference::{ReferenceBases, reference_base};
use crate::state::ConsensusState;

/// Why a group's indels could not be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileFailure {
    /// Equal numbers of members did and did not insert at a position
    InsertionTie { position: i64 },
    /// Equal numbers of members did and did not delete at a position
    DeletionTie { position: i64 },
    /// No member covered a position between covered positions
    CoverageGap { position: i64 },
    /// The voted alignment is not a valid read alignment
    InvalidShape,
}

/// Reconciles indel placements across the members of one group.
pub struct IndelReconciler<'r> {
    reference: &'r dyn ReferenceBases,
}

impl<'r> IndelReconciler<'r> {
    #[must_use]
    pub fn new(reference: &'r dyn ReferenceBases) -> Self {
        Self { reference }
    }

    /// Fills `state` with the voted columns and sets its outcome.
    ///
    /// Returns the terminal outcome: [`ConsensusOutcome::IndelMatch`] when every member
    /// shares one alignment, [`ConsensusOutcome::IndelMismatch`] when differing placements
    /// were reconciled, or [`ConsensusOutcome::IndelFail`].
    pub fn reconcile(&self, members: &[&Fragment], state: &mut ConsensusState) -> ConsensusOutcome {
        let outcome = match self.fill_columns(members, state) {
            Ok(()) if !has_valid_shape(state.cigar()) => {
                debug!("Reconciled alignment has invalid shape: {:?}", ReconcileFailure::InvalidShape);
                ConsensusOutcome::IndelFail
            }
            Ok(()) if all_alignments_identical(members) => ConsensusOutcome::IndelMatch,
            Ok(()) => ConsensusOutcome::IndelMismatch,
            Err(failure) => {
                debug!("Indel placements could not be reconciled: {failure:?}");
                ConsensusOutcome::IndelFail
            }
        };
        state.set_outcome(outcome);
        outcome
    }

    fn fill_columns(
        &self,
        members: &[&Fragment],
        state: &mut ConsensusState,
    ) -> Result<(), ReconcileFailure> {
        let direction = state.direction();
        let dual_strand = state.is_dual_strand();
        let chromosome = state.chromosome().to_string();
        let mut cursors: Vec<ReadCursor<'_>> =
            members.iter().map(|f| ReadCursor::with_edge_insertions(f, direction)).collect();
        let mut column = ColumnObservations::new();
        let mut position = state.frame_start();

        while cursors.iter().any(|c| !c.is_exhausted()) {
            let active: Vec<usize> = (0..cursors.len())
                .filter(|&i| !cursors[i].is_exhausted() && !cursors[i].is_ahead(position))
                .collect();
            if active.is_empty() {
                return Err(ReconcileFailure::CoverageGap { position });
            }
            let n = active.len();

            let inserting: Vec<usize> =
                active.iter().copied().filter(|&i| cursors[i].is_insertion()).collect();
            if !inserting.is_empty() {
                if 2 * inserting.len() == n {
                    return Err(ReconcileFailure::InsertionTie { position });
                }
                if 2 * inserting.len() > n {
                    column.reset();
                    for &i in &inserting {
                        observe(&cursors[i], &mut column);
                        cursors[i].advance();
                    }
                    state.push_column(Kind::Insertion, position, Some(column.call(dual_strand, None)), None);
                } else {
                    for &i in &active {
                        cursors[i].skip_insertions();
                    }
                }
                continue;
            }

            let deleting = active.iter().filter(|&&i| cursors[i].is_deletion()).count();
            if deleting > 0 && 2 * deleting == n {
                return Err(ReconcileFailure::DeletionTie { position });
            }

            if 2 * deleting > n {
                state.push_column(Kind::Deletion, position, None, None);
            } else {
                column.reset();
                let mut edge_inserting = 0;
                for &i in &active {
                    observe(&cursors[i], &mut column);
                    if cursors[i].is_edge_insertion() {
                        edge_inserting += 1;
                    }
                }
                let kind = if state.is_within_alignment(position) {
                    Kind::Match
                } else if 2 * edge_inserting > n {
                    Kind::Insertion
                } else {
                    Kind::SoftClip
                };
                let ref_base = if kind == Kind::Insertion {
                    None
                } else {
                    reference_base(self.reference, &chromosome, position)
                };
                state.push_column(kind, position, Some(column.call(dual_strand, ref_base)), ref_base);
            }

            for &i in &active {
                cursors[i].advance();
            }
            position += direction.step();
        }

        Ok(())
    }
}

/// Adds the cursor's current base, if any, to the column.
pub(crate) fn observe(cursor: &ReadCursor<'_>, column: &mut ColumnObservations) {
    if let (Some(base), Some(qual)) = (cursor.current_base(), cursor.current_quality()) {
        column.add(base, qual, cursor.fragment().is_first_of_pair());
    }
}

fn all_alignments_identical(members: &[&Fragment]) -> bool {
    members.split_first().is_none_or(|(first, rest)| {
        rest.iter().all(|f| {
            f.alignment_start() == first.alignment_start() && f.cigar() == first.cigar()
        })
    })
}
