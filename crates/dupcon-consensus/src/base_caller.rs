//! # Column Consensus Calling
//!
//! Calls one consensus base and quality from all observations of a single column.
//!
//! ## Single-strand vote
//!
//! Observations are tallied per base into fixed slots `A`, `C`, `G`, `T` and `N` (any other
//! byte is counted as `N`). Each slot tracks the observation count, the summed quality and
//! the maximum quality. The winner is the slot with the highest summed quality. Equal sums
//! are resolved in favour of the reference base when one is known, otherwise the earlier
//! slot in `A, C, G, T, N` order wins. The vote therefore never depends on the order in
//! which observations were added.
//!
//! The quality of the call discounts the winner's best quality by the weight of
//! disagreement:
//!
//! ```text
//! Q = round(maxQ(winner) * max(0, sum(winner) - sum(others)) / sum(winner))
//! ```
//!
//! A winner whose quality sum is zero gets quality zero.
//!
//! ## Dual-strand vote
//!
//! When a group holds both first- and second-of-pair reads, each side is voted on its own.
//! If one side has no observation the other side's call is returned unchanged. If both agree
//! the quality is the larger of the two. If they disagree, the side matching the reference
//! base wins; without a reference match the higher-quality side wins (first side on ties).
//! Either way the winner's quality is reduced by the loser's, floored at zero, and the
//! disagreement is reported so callers can count it.
//!
//! ## Example
//!
//! ```
//! use dupcon_consensus::base_caller::call_column;
//!
//! // Two reads disagree: Q30 `A` against Q20 `C`.
//! assert_eq!(call_column(b"AC", &[30, 20], None), (b'A', 10));
//! ```

/// Base emitted when a column has no observations.
pub const NO_CALL_BASE: u8 = b'N';

/// Quality emitted when a column has no observations.
pub const NO_CALL_QUALITY: u8 = 0;

const SLOT_BASES: [u8; 5] = [b'A', b'C', b'G', b'T', b'N'];

#[inline]
fn slot_of(base: u8) -> usize {
    match base.to_ascii_uppercase() {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' => 3,
        _ => 4,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: u32,
    total: u32,
    max: u8,
}

/// Accumulates observations for one column and calls the single-strand consensus.
///
/// Reusable across columns via [`BaseConsensusCaller::reset`].
#[derive(Debug, Clone, Default)]
pub struct BaseConsensusCaller {
    tallies: [Tally; 5],
    contributions: usize,
}

impl BaseConsensusCaller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all observations.
    pub fn reset(&mut self) {
        self.tallies = [Tally::default(); 5];
        self.contributions = 0;
    }

    /// Adds one observation.
    pub fn add(&mut self, base: u8, quality: u8) {
        let tally = &mut self.tallies[slot_of(base)];
        tally.count += 1;
        tally.total += u32::from(quality);
        tally.max = tally.max.max(quality);
        self.contributions += 1;
    }

    /// Number of observations added since the last reset.
    #[must_use]
    pub fn contributions(&self) -> usize {
        self.contributions
    }

    /// Calls the consensus base and quality.
    ///
    /// `ref_base` breaks ties between equal quality sums; pass `None` when the reference
    /// position is unknown.
    #[must_use]
    pub fn call(&self, ref_base: Option<u8>) -> (u8, u8) {
        let ref_slot = ref_base.map(slot_of);

        let mut winner: Option<usize> = None;
        for (slot, tally) in self.tallies.iter().enumerate() {
            if tally.count == 0 {
                continue;
            }
            winner = match winner {
                None => Some(slot),
                Some(best) => {
                    let best_total = self.tallies[best].total;
                    let wins_tie = tally.total == best_total
                        && ref_slot == Some(slot)
                        && ref_slot != Some(best);
                    if tally.total > best_total || wins_tie { Some(slot) } else { Some(best) }
                }
            };
        }

        let Some(winner) = winner else {
            return (NO_CALL_BASE, NO_CALL_QUALITY);
        };

        let win = self.tallies[winner];
        if win.total == 0 {
            return (SLOT_BASES[winner], 0);
        }
        let others: u32 =
            self.tallies.iter().enumerate().filter(|(s, _)| *s != winner).map(|(_, t)| t.total).sum();
        let agreement = win.total.saturating_sub(others);
        let quality = (f64::from(win.max) * f64::from(agreement) / f64::from(win.total)).round();

        (SLOT_BASES[winner], quality as u8)
    }
}

/// Calls one column from parallel base and quality slices.
///
/// # Examples
///
/// ```
/// use dupcon_consensus::base_caller::call_column;
///
/// assert_eq!(call_column(b"GGG", &[30, 30, 30], None), (b'G', 30));
/// assert_eq!(call_column(b"", &[], None), (b'N', 0));
/// ```
#[must_use]
pub fn call_column(bases: &[u8], quals: &[u8], ref_base: Option<u8>) -> (u8, u8) {
    let mut caller = BaseConsensusCaller::new();
    for (&base, &qual) in bases.iter().zip(quals) {
        caller.add(base, qual);
    }
    caller.call(ref_base)
}

/// Result of calling a column that may carry observations from both strands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCall {
    pub base: u8,
    pub quality: u8,
    /// True if the two strands called different bases
    pub strand_mismatch: bool,
}

/// Combines independent first- and second-of-pair calls.
#[must_use]
pub fn call_dual_strand(
    first: &BaseConsensusCaller,
    second: &BaseConsensusCaller,
    ref_base: Option<u8>,
) -> ColumnCall {
    let single = |(base, quality): (u8, u8)| ColumnCall { base, quality, strand_mismatch: false };

    if first.contributions() == 0 {
        return single(second.call(ref_base));
    }
    if second.contributions() == 0 {
        return single(first.call(ref_base));
    }

    let (b1, q1) = first.call(ref_base);
    let (b2, q2) = second.call(ref_base);
    if b1 == b2 {
        return ColumnCall { base: b1, quality: q1.max(q2), strand_mismatch: false };
    }

    let first_wins = match ref_base {
        Some(r) if r == b1 => true,
        Some(r) if r == b2 => false,
        _ => q1 >= q2,
    };
    let (base, quality) =
        if first_wins { (b1, q1.saturating_sub(q2)) } else { (b2, q2.saturating_sub(q1)) };
    ColumnCall { base, quality, strand_mismatch: true }
}

/// Per-column observations split by strand, for single- or dual-strand calling.
#[derive(Debug, Clone, Default)]
pub struct ColumnObservations {
    all: BaseConsensusCaller,
    first: BaseConsensusCaller,
    second: BaseConsensusCaller,
}

impl ColumnObservations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.all.reset();
        self.first.reset();
        self.second.reset();
    }

    /// Adds one observation from a first-of-pair (`is_first`) or other read.
    pub fn add(&mut self, base: u8, quality: u8, is_first: bool) {
        self.all.add(base, quality);
        if is_first {
            self.first.add(base, quality);
        } else {
            self.second.add(base, quality);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.contributions() == 0
    }

    /// Calls the column, voting each strand separately when `dual_strand` is set.
    #[must_use]
    pub fn call(&self, dual_strand: bool, ref_base: Option<u8>) -> ColumnCall {
        if dual_strand {
            call_dual_strand(&self.first, &self.second, ref_base)
        } else {
            let (base, quality) = self.all.call(ref_base);
            ColumnCall { base, quality, strand_mismatch: false }
        }
    }
}
