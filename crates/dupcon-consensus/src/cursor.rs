//! Strand-agnostic traversal of one fragment's alignment, one column at a time.
//!
//! A [`ReadCursor`] walks a fragment's CIGAR either left-to-right ([`Direction::Forward`])
//! or right-to-left ([`Direction::Reverse`]). Every step lands on one *column*:
//!
//! | Operation      | Read base | Reference column |
//! |----------------|-----------|------------------|
//! | `S`, `M`, `=`, `X` | yes   | yes              |
//! | `D`, `N`       | no        | yes              |
//! | `I`            | yes       | no               |
//!
//! Hard clips, pads and zero-length operations are skipped. Soft-clipped columns are
//! placed on the reference coordinates they would occupy if aligned, so traversal starts
//! at the unclipped start (forward) or unclipped end (reverse).
//!
//! [`ReadCursor::position`] is always the next reference column to be emitted in the
//! traversal direction. An insertion therefore reports the position of the column that
//! follows it, which lets callers evaluate insertions before the column they precede
//! regardless of direction.
//!
//! A cursor built with [`ReadCursor::with_edge_insertions`] instead places insertions at
//! either end of the alignment (outside the first and last reference-consuming operation)
//! on the reference axis, exactly like soft clips. An edge insertion and a soft clip that
//! hold the same read base then land on the same column.

use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;

use crate::fragment::Fragment;

/// Traversal direction over a fragment's alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Direction matching the fragment's strand.
    #[must_use]
    pub fn of(fragment: &Fragment) -> Self {
        if fragment.is_reverse() { Self::Reverse } else { Self::Forward }
    }

    /// Signed reference step per column.
    #[inline]
    #[must_use]
    pub fn step(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

/// True if the operation carries a read base.
#[inline]
fn has_base(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch | Kind::SoftClip | Kind::Insertion
    )
}

/// A column-at-a-time cursor over one fragment.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    fragment: &'a Fragment,
    direction: Direction,
    ops: &'a [Op],
    /// Forward-order indices of the first and last reference-consuming operations
    reference_span: Option<(usize, usize)>,
    edge_insertions: bool,
    /// Operation index in traversal order
    op_index: usize,
    /// Columns already consumed within the current operation
    op_offset: usize,
    read_index: isize,
    position: i64,
    exhausted: bool,
}

impl<'a> ReadCursor<'a> {
    /// Creates a cursor positioned on the first column in `direction`.
    #[must_use]
    pub fn new(fragment: &'a Fragment, direction: Direction) -> Self {
        Self::build(fragment, direction, false)
    }

    /// Creates a cursor that places edge insertions on the reference axis like soft clips.
    #[must_use]
    pub fn with_edge_insertions(fragment: &'a Fragment, direction: Direction) -> Self {
        Self::build(fragment, direction, true)
    }

    fn build(fragment: &'a Fragment, direction: Direction, edge_insertions: bool) -> Self {
        let ops = fragment.cigar();
        let consumes_reference = |op: &Op| op.len() > 0 && op.kind().consumes_reference();
        let reference_span =
            ops.iter().position(consumes_reference).zip(ops.iter().rposition(consumes_reference));

        let (start, end) = if edge_insertions {
            (fragment.padded_start(), fragment.padded_end())
        } else {
            (fragment.unclipped_start(), fragment.unclipped_end())
        };
        let (read_index, position) = match direction {
            Direction::Forward => (0, start),
            Direction::Reverse => (fragment.bases().len() as isize - 1, end),
        };
        let mut cursor = Self {
            fragment,
            direction,
            ops,
            reference_span,
            edge_insertions,
            op_index: 0,
            op_offset: 0,
            read_index,
            position,
            exhausted: false,
        };
        cursor.skip_empty_ops();
        cursor
    }

    #[must_use]
    pub fn fragment(&self) -> &'a Fragment {
        self.fragment
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Next reference column in the traversal direction.
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Forward-order index of the current operation.
    fn current_index(&self) -> Option<usize> {
        if self.exhausted {
            return None;
        }
        match self.direction {
            Direction::Forward => (self.op_index < self.ops.len()).then_some(self.op_index),
            Direction::Reverse => self.ops.len().checked_sub(self.op_index + 1),
        }
    }

    fn current_op(&self) -> Option<&'a Op> {
        self.current_index().and_then(|i| self.ops.get(i))
    }

    /// True if the operation at forward `index` lies outside the reference-consuming span.
    fn is_edge(&self, index: usize) -> bool {
        self.reference_span.is_none_or(|(first, last)| index < first || index > last)
    }

    /// True if the current operation places a column on the reference axis.
    fn occupies_column(&self) -> bool {
        match self.current_kind() {
            Some(Kind::Insertion) => self.edge_insertions && self.is_edge_insertion(),
            Some(Kind::HardClip | Kind::Pad) | None => false,
            Some(_) => true,
        }
    }

    /// Operation kind at the current column.
    #[must_use]
    pub fn current_kind(&self) -> Option<Kind> {
        self.current_op().map(|op| op.kind())
    }

    fn current_read_index(&self) -> Option<usize> {
        let kind = self.current_kind()?;
        if has_base(kind) { usize::try_from(self.read_index).ok() } else { None }
    }

    /// Read base at the current column; `None` for deletions or an exhausted cursor.
    #[must_use]
    pub fn current_base(&self) -> Option<u8> {
        self.current_read_index().and_then(|i| self.fragment.bases().get(i).copied())
    }

    /// Base quality at the current column; `None` where there is no base.
    #[must_use]
    pub fn current_quality(&self) -> Option<u8> {
        self.current_read_index().and_then(|i| self.fragment.quals().get(i).copied())
    }

    /// True inside an insertion that precedes the next reference column.
    ///
    /// Edge insertions of a cursor built with [`ReadCursor::with_edge_insertions`] occupy
    /// their own column and do not count.
    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.current_kind() == Some(Kind::Insertion) && !self.occupies_column()
    }

    /// True inside an insertion before the first or after the last reference-consuming
    /// operation.
    #[must_use]
    pub fn is_edge_insertion(&self) -> bool {
        self.current_kind() == Some(Kind::Insertion)
            && self.current_index().is_some_and(|i| self.is_edge(i))
    }

    #[must_use]
    pub fn is_deletion(&self) -> bool {
        matches!(self.current_kind(), Some(Kind::Deletion | Kind::Skip))
    }

    /// True if the cursor has not yet reached reference column `position`.
    #[must_use]
    pub fn is_behind(&self, position: i64) -> bool {
        match self.direction {
            Direction::Forward => self.position < position,
            Direction::Reverse => self.position > position,
        }
    }

    /// True if the cursor has already moved past reference column `position`.
    #[must_use]
    pub fn is_ahead(&self, position: i64) -> bool {
        match self.direction {
            Direction::Forward => self.position > position,
            Direction::Reverse => self.position < position,
        }
    }

    /// Moves to the next column.
    pub fn advance(&mut self) {
        let Some(op) = self.current_op() else {
            return;
        };
        if has_base(op.kind()) {
            self.read_index += self.direction.step() as isize;
        }
        if self.occupies_column() {
            self.position += self.direction.step();
        }
        self.op_offset += 1;
        if self.op_offset >= op.len() {
            self.op_index += 1;
            self.op_offset = 0;
            self.skip_empty_ops();
        }
    }

    /// Advances past any insertion run at the current position.
    pub fn skip_insertions(&mut self) {
        while self.is_insertion() {
            self.advance();
        }
    }

    /// Advances until the cursor is no longer behind `position`, passing over insertions
    /// that precede it.
    pub fn advance_to(&mut self, position: i64) {
        while !self.exhausted && (self.is_behind(position) || self.is_insertion()) {
            self.advance();
        }
    }

    fn skip_empty_ops(&mut self) {
        loop {
            match self.current_op() {
                None => {
                    self.exhausted = true;
                    return;
                }
                Some(op) if op.len() == 0 || matches!(op.kind(), Kind::HardClip | Kind::Pad) => {
                    self.op_index += 1;
                }
                Some(_) => return,
            }
        }
    }
}
