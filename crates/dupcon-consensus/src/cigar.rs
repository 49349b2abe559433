//! Helpers over alignment operation lists (`Vec<Op>`).

use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;

/// Returns the SAM character for an operation kind.
#[must_use]
pub fn kind_to_char(kind: Kind) -> char {
    match kind {
        Kind::Match => 'M',
        Kind::Insertion => 'I',
        Kind::Deletion => 'D',
        Kind::Skip => 'N',
        Kind::SoftClip => 'S',
        Kind::HardClip => 'H',
        Kind::Pad => 'P',
        Kind::SequenceMatch => '=',
        Kind::SequenceMismatch => 'X',
    }
}

fn char_to_kind(c: char) -> Option<Kind> {
    let kind = match c {
        'M' => Kind::Match,
        'I' => Kind::Insertion,
        'D' => Kind::Deletion,
        'N' => Kind::Skip,
        'S' => Kind::SoftClip,
        'H' => Kind::HardClip,
        'P' => Kind::Pad,
        '=' => Kind::SequenceMatch,
        'X' => Kind::SequenceMismatch,
        _ => return None,
    };
    Some(kind)
}

/// Parses a SAM CIGAR string. `*` and the empty string parse to no operations.
///
/// Returns `None` for malformed input.
///
/// # Examples
///
/// ```
/// use dupcon_consensus::cigar::{cigar_to_string, parse_cigar};
///
/// let ops = parse_cigar("5S10M2I3M").unwrap();
/// assert_eq!(cigar_to_string(&ops), "5S10M2I3M");
/// assert!(parse_cigar("10Q").is_none());
/// ```
#[must_use]
pub fn parse_cigar(cigar: &str) -> Option<Vec<Op>> {
    if cigar == "*" {
        return Some(Vec::new());
    }

    let mut ops = Vec::new();
    let mut len: Option<usize> = None;
    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            let current = len.unwrap_or(0);
            len = Some(current.checked_mul(10)?.checked_add(digit as usize)?);
        } else {
            let kind = char_to_kind(c)?;
            ops.push(Op::new(kind, len.take()?));
        }
    }

    if len.is_some() { None } else { Some(ops) }
}

/// Formats operations as a SAM CIGAR string, `*` when empty.
#[must_use]
pub fn cigar_to_string(ops: &[Op]) -> String {
    if ops.is_empty() {
        return "*".to_string();
    }
    ops.iter().map(|op| format!("{}{}", op.len(), kind_to_char(op.kind()))).collect()
}

/// True for M, = and X.
#[inline]
#[must_use]
pub fn is_aligned(kind: Kind) -> bool {
    matches!(kind, Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch)
}

/// Number of read bases described by the operations.
#[must_use]
pub fn read_length(ops: &[Op]) -> usize {
    ops.iter().filter(|op| op.kind().consumes_read()).map(|op| op.len()).sum()
}

/// Number of reference bases spanned by the operations.
#[must_use]
pub fn reference_length(ops: &[Op]) -> usize {
    ops.iter().filter(|op| op.kind().consumes_reference()).map(|op| op.len()).sum()
}

/// Number of bases aligned to the reference (M, = and X).
#[must_use]
pub fn aligned_bases(ops: &[Op]) -> usize {
    ops.iter().filter(|op| is_aligned(op.kind())).map(|op| op.len()).sum()
}

/// Total soft-clipped bases at either end.
#[must_use]
pub fn soft_clipped_bases(ops: &[Op]) -> usize {
    ops.iter().filter(|op| op.kind() == Kind::SoftClip).map(|op| op.len()).sum()
}

/// Soft-clipped bases before the first aligned operation, ignoring hard clips.
#[must_use]
pub fn leading_soft_clip(ops: &[Op]) -> usize {
    ops.iter()
        .skip_while(|op| op.kind() == Kind::HardClip)
        .take_while(|op| op.kind() == Kind::SoftClip)
        .map(|op| op.len())
        .sum()
}

/// Soft-clipped bases after the last aligned operation, ignoring hard clips.
#[must_use]
pub fn trailing_soft_clip(ops: &[Op]) -> usize {
    ops.iter()
        .rev()
        .skip_while(|op| op.kind() == Kind::HardClip)
        .take_while(|op| op.kind() == Kind::SoftClip)
        .map(|op| op.len())
        .sum()
}

/// Inserted bases between the leading clips and the first reference-consuming operation.
#[must_use]
pub fn leading_edge_insertion(ops: &[Op]) -> usize {
    edge_insertion(ops.iter())
}

/// Inserted bases between the last reference-consuming operation and the trailing clips.
#[must_use]
pub fn trailing_edge_insertion(ops: &[Op]) -> usize {
    edge_insertion(ops.iter().rev())
}

fn edge_insertion<'a>(ops: impl Iterator<Item = &'a Op>) -> usize {
    ops.filter(|op| op.len() > 0)
        .skip_while(|op| matches!(op.kind(), Kind::HardClip | Kind::SoftClip))
        .take_while(|op| op.kind() == Kind::Insertion)
        .map(|op| op.len())
        .sum()
}

/// True if any operation is an insertion or deletion.
#[must_use]
pub fn has_indel(ops: &[Op]) -> bool {
    ops.iter().any(|op| matches!(op.kind(), Kind::Insertion | Kind::Deletion))
}

/// True if the operations describe a well-formed consensus alignment.
///
/// Requires at least one aligned operation, soft clips only at the ends, and edge
/// operations (ignoring hard clips) that are aligned, soft-clipped or inserted.
#[must_use]
pub fn has_valid_shape(ops: &[Op]) -> bool {
    let ops: Vec<&Op> = ops.iter().filter(|op| op.kind() != Kind::HardClip).collect();
    let (Some(first), Some(last)) = (ops.first(), ops.last()) else {
        return false;
    };
    let valid_edge = |kind: Kind| is_aligned(kind) || matches!(kind, Kind::SoftClip | Kind::Insertion);
    if !valid_edge(first.kind()) || !valid_edge(last.kind()) {
        return false;
    }
    if !ops.iter().any(|op| is_aligned(op.kind())) {
        return false;
    }

    let leading = ops.iter().take_while(|op| op.kind() == Kind::SoftClip).count();
    let trailing = ops.iter().rev().take_while(|op| op.kind() == Kind::SoftClip).count();
    ops[leading..ops.len() - trailing].iter().all(|op| op.kind() != Kind::SoftClip)
}

/// Appends one column of `kind`, extending the last operation when it has the same kind.
pub fn push_op(ops: &mut Vec<Op>, kind: Kind) {
    if let Some(last) = ops.last_mut() {
        if last.kind() == kind {
            *last = Op::new(kind, last.len() + 1);
            return;
        }
    }
    ops.push(Op::new(kind, 1));
}
