// Copyright (c) 2025, Fulcrum Genomics LLC
// All rights reserved.

//! Hamming distance helpers for barcode comparison.
//!
//! Barcodes of different lengths are never comparable: every function here treats
//! a length mismatch as "too far apart" rather than as an error.

/// Count the number of mismatching positions between two barcodes.
///
/// Returns `usize::MAX` if the barcodes have different lengths.
///
/// # Examples
///
/// ```
/// use dupcon_umi::distance::count_mismatches;
///
/// assert_eq!(count_mismatches("AAAAA", "AAAAT"), 1);
/// assert_eq!(count_mismatches("AAAAA", "AAAA"), usize::MAX);
/// ```
#[must_use]
pub fn count_mismatches(a: &str, b: &str) -> usize {
    if a.len() != b.len() {
        return usize::MAX;
    }
    a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count()
}

/// Check if two barcodes match within a maximum mismatch threshold.
///
/// Scans positions left to right and stops as soon as the number of mismatches
/// exceeds `max_mismatches`.
///
/// # Examples
///
/// ```
/// use dupcon_umi::distance::matches_within_threshold;
///
/// assert!(matches_within_threshold("AAAAA", "AAATT", 2));
/// assert!(!matches_within_threshold("AAAAA", "AAATT", 1));
/// ```
#[must_use]
pub fn matches_within_threshold(a: &str, b: &str, max_mismatches: usize) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut mismatches = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        if x != y {
            mismatches += 1;
            if mismatches > max_mismatches {
                return false;
            }
        }
    }
    true
}

/// Returns `true` when two barcodes differ by more than `max_mismatches` positions.
///
/// Always `true` for barcodes of unequal length, regardless of content.
#[inline]
#[must_use]
pub fn exceeds_diff(a: &str, b: &str, max_mismatches: usize) -> bool {
    !matches_within_threshold(a, b, max_mismatches)
}
