// Copyright (c) 2025, Fulcrum Genomics LLC
// All rights reserved.

//! Clustering of fragments into duplicate groups by molecular barcode.
//!
//! Fragments are first bucketed by their exact barcode, then merged greedily in three
//! named passes:
//!
//! 1. **Directional**: groups are visited largest-first and each anchor absorbs later,
//!    smaller-or-equal groups within `D` mismatches of any barcode already in the anchor.
//! 2. **Second pass**: remaining groups within `D + 1` mismatches are merged symmetrically.
//! 3. **Duplex** (optional): groups whose coordinate keys mirror each other and whose
//!    two-part barcodes match crosswise are paired and marked as duplex.
//!
//! The passes use different thresholds and pairing predicates and are kept separate
//! rather than folded into a single union-find.

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::distance::matches_within_threshold;

/// Anything that carries a molecular barcode and a duplicate-coordinate key.
pub trait Barcoded {
    /// The raw barcode (UMI) string.
    fn barcode(&self) -> &str;

    /// The key describing the genomic coordinates shared by duplicates.
    fn coordinate_key(&self) -> &str;
}

/// Options controlling barcode clustering.
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Maximum substitutions between barcodes merged in the directional pass.
    pub edit_distance: u32,
    /// Delimiter between the two halves of a duplex barcode; `None` disables the duplex pass.
    pub duplex_delimiter: Option<String>,
    /// Known barcode whitelist enabling the exact-match fast path.
    pub canonical_barcodes: Option<AHashSet<String>>,
    /// Suffix that marks the coordinate key of a reversed fragment.
    pub reversed_key_marker: String,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            edit_distance: 1,
            duplex_delimiter: None,
            canonical_barcodes: None,
            reversed_key_marker: "_R".to_string(),
        }
    }
}

/// A cluster of fragments believed to originate from the same molecule.
///
/// Members are borrowed from the caller; the group never copies fragments.
#[derive(Debug)]
pub struct DuplicateGroup<'a, T> {
    coordinate_key: String,
    barcodes: Vec<String>,
    members: Vec<&'a T>,
    duplex: bool,
}

impl<'a, T> DuplicateGroup<'a, T> {
    fn new(coordinate_key: &str, barcode: &str) -> Self {
        Self {
            coordinate_key: coordinate_key.to_string(),
            barcodes: vec![barcode.to_string()],
            members: Vec::new(),
            duplex: false,
        }
    }

    /// The representative barcode, i.e. the barcode of the group that anchored the cluster.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.barcodes[0]
    }

    /// Coordinate key of the anchoring group.
    #[must_use]
    pub fn coordinate_key(&self) -> &str {
        &self.coordinate_key
    }

    /// Every distinct barcode absorbed into this group, representative first.
    #[must_use]
    pub fn barcodes(&self) -> &[String] {
        &self.barcodes
    }

    #[must_use]
    pub fn members(&self) -> &[&'a T] {
        &self.members
    }

    #[must_use]
    pub fn into_members(self) -> Vec<&'a T> {
        self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if this group was formed by pairing the two strands of a duplex molecule.
    #[must_use]
    pub fn is_duplex(&self) -> bool {
        self.duplex
    }

    /// Absorbs `other` into this group, keeping this group's name and coordinate key.
    pub fn merge(&mut self, other: DuplicateGroup<'a, T>) {
        self.members.extend(other.members);
        self.barcodes.extend(other.barcodes);
        self.duplex |= other.duplex;
    }

    fn push(&mut self, fragment: &'a T) {
        self.members.push(fragment);
    }

    /// True if any barcode in `self` is within `max_mismatches` of any barcode in `other`.
    fn is_within(&self, other: &Self, max_mismatches: usize) -> bool {
        self.barcodes
            .iter()
            .any(|a| other.barcodes.iter().any(|b| matches_within_threshold(a, b, max_mismatches)))
    }
}

/// Groups fragments into duplicate groups by barcode.
#[derive(Debug, Clone, Default)]
pub struct BarcodeClusterer {
    options: ClusterOptions,
}

impl BarcodeClusterer {
    #[must_use]
    pub fn new(options: ClusterOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Clusters `fragments` into duplicate groups.
    ///
    /// Output order is deterministic for a given input order: groups appear in
    /// descending size of their initial exact-barcode bucket, ties in first-seen order.
    pub fn cluster<'a, T, I>(&self, fragments: I) -> Vec<DuplicateGroup<'a, T>>
    where
        T: Barcoded,
        I: IntoIterator<Item = &'a T>,
    {
        let fragments: Vec<&'a T> = fragments.into_iter().collect();
        if fragments.is_empty() {
            return Vec::new();
        }

        let mut groups = bucket_by_barcode(&fragments);

        if let Some(canonical) = &self.options.canonical_barcodes {
            if fragments.iter().all(|f| canonical.contains(f.barcode())) {
                debug!("All {} barcodes are canonical, skipping fuzzy merge", fragments.len());
                return groups;
            }
        }

        let d = self.options.edit_distance as usize;
        directional_pass(&mut groups, d);
        debug!("Directional pass at distance {d} left {} groups", groups.len());

        second_pass(&mut groups, d + 1);
        debug!("Second pass at distance {} left {} groups", d + 1, groups.len());

        if let Some(delimiter) = &self.options.duplex_delimiter {
            duplex_pass(&mut groups, delimiter, &self.options.reversed_key_marker, d);
            debug!("Duplex pass left {} groups", groups.len());
        }

        groups
    }
}

/// Buckets fragments by exact (coordinate key, barcode), then stable-sorts by size descending.
fn bucket_by_barcode<'a, T: Barcoded>(fragments: &[&'a T]) -> Vec<DuplicateGroup<'a, T>> {
    let mut index: AHashMap<(&str, &str), usize> = AHashMap::new();
    let mut groups: Vec<DuplicateGroup<'a, T>> = Vec::new();

    for &fragment in fragments {
        let key = (fragment.coordinate_key(), fragment.barcode());
        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(DuplicateGroup::new(key.0, key.1));
            groups.len() - 1
        });
        groups[idx].push(fragment);
    }

    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}

/// Size-anchored greedy merge at `max_mismatches`.
///
/// After each absorption the inner scan restarts immediately after the anchor, since the
/// newly absorbed barcode may bridge to a group that was skipped earlier.
fn directional_pass<T>(groups: &mut Vec<DuplicateGroup<'_, T>>, max_mismatches: usize) {
    let mut i = 0;
    while i < groups.len() {
        let mut j = i + 1;
        while j < groups.len() {
            let anchor = &groups[i];
            let candidate = &groups[j];
            if candidate.len() <= anchor.len()
                && candidate.coordinate_key == anchor.coordinate_key
                && anchor.is_within(candidate, max_mismatches)
            {
                let absorbed = groups.remove(j);
                groups[i].merge(absorbed);
                j = i + 1;
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

/// Symmetric merge at `max_mismatches`, repeated until no two groups remain mergeable.
fn second_pass<T>(groups: &mut Vec<DuplicateGroup<'_, T>>, max_mismatches: usize) {
    loop {
        let mut merged_any = false;
        let mut i = 0;
        while i < groups.len() {
            let mut j = i + 1;
            while j < groups.len() {
                if groups[j].coordinate_key == groups[i].coordinate_key
                    && groups[i].is_within(&groups[j], max_mismatches)
                {
                    let absorbed = groups.remove(j);
                    groups[i].merge(absorbed);
                    merged_any = true;
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged_any {
            break;
        }
    }
}

/// Pairs groups from opposite strands of a duplex molecule.
///
/// Each group takes part in at most one pairing.
fn duplex_pass<T>(
    groups: &mut Vec<DuplicateGroup<'_, T>>,
    delimiter: &str,
    marker: &str,
    max_mismatches: usize,
) {
    let mut i = 0;
    while i < groups.len() {
        if groups[i].duplex {
            i += 1;
            continue;
        }
        let partner = (i + 1..groups.len()).find(|&j| {
            !groups[j].duplex
                && is_mirrored_key(&groups[i].coordinate_key, &groups[j].coordinate_key, marker)
                && is_duplex_pair(groups[i].name(), groups[j].name(), delimiter, max_mismatches)
        });
        if let Some(j) = partner {
            let absorbed = groups.remove(j);
            groups[i].merge(absorbed);
            groups[i].duplex = true;
        }
        i += 1;
    }
}

/// True if one key equals the other followed by the reversed-fragment marker.
#[must_use]
pub fn is_mirrored_key(a: &str, b: &str, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    a.strip_suffix(marker) == Some(b) || b.strip_suffix(marker) == Some(a)
}

/// True if `a = X<delim>Y` and `b = P<delim>Q` with `X ~ Q` and `Y ~ P` within
/// `max_mismatches` each.
#[must_use]
pub fn is_duplex_pair(a: &str, b: &str, delimiter: &str, max_mismatches: usize) -> bool {
    let (Some((a1, a2)), Some((b1, b2))) = (a.split_once(delimiter), b.split_once(delimiter))
    else {
        return false;
    };
    matches_within_threshold(a1, b2, max_mismatches)
        && matches_within_threshold(a2, b1, max_mismatches)
}
