//! Reference base lookup used for tie-breaking and mutation counting.

use ahash::AHashMap;

/// Read-only access to reference sequence bases.
///
/// Implementations must return stable answers for the lifetime of a consensus run.
pub trait ReferenceBases: Send + Sync {
    /// Length of `chromosome`, or `None` if it is not known.
    fn chromosome_length(&self, chromosome: &str) -> Option<usize>;

    /// Base at 1-based `position` on `chromosome`, or `None` if unavailable.
    fn base_at(&self, chromosome: &str, position: usize) -> Option<u8>;
}

/// Looks up the uppercase reference base at a possibly out-of-bounds position.
///
/// Positions before the chromosome start or past its end (e.g. from soft-clip overrun)
/// and ambiguous reference bases yield `None`, meaning "position unknown".
#[must_use]
pub fn reference_base(
    reference: &dyn ReferenceBases,
    chromosome: &str,
    position: i64,
) -> Option<u8> {
    let length = reference.chromosome_length(chromosome)?;
    let position = usize::try_from(position).ok().filter(|&p| p >= 1 && p <= length)?;
    let base = reference.base_at(chromosome, position)?.to_ascii_uppercase();
    matches!(base, b'A' | b'C' | b'G' | b'T').then_some(base)
}

/// A reference that knows no chromosomes; every lookup is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReference;

impl ReferenceBases for NoReference {
    fn chromosome_length(&self, _chromosome: &str) -> Option<usize> {
        None
    }

    fn base_at(&self, _chromosome: &str, _position: usize) -> Option<u8> {
        None
    }
}

/// Reference sequences held in memory, keyed by chromosome name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReference {
    sequences: AHashMap<String, Vec<u8>>,
}

impl InMemoryReference {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a chromosome, returning `self` for chaining.
    #[must_use]
    pub fn with_sequence(mut self, chromosome: &str, bases: &[u8]) -> Self {
        self.insert(chromosome, bases.to_vec());
        self
    }

    pub fn insert(&mut self, chromosome: &str, bases: Vec<u8>) {
        self.sequences.insert(chromosome.to_string(), bases);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl ReferenceBases for InMemoryReference {
    fn chromosome_length(&self, chromosome: &str) -> Option<usize> {
        self.sequences.get(chromosome).map(Vec::len)
    }

    fn base_at(&self, chromosome: &str, position: usize) -> Option<u8> {
        let index = position.checked_sub(1)?;
        self.sequences.get(chromosome)?.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, Some(b'A'))]
    #[case(4, Some(b'T'))]
    #[case(5, None)]
    #[case(6, None)]
    #[case(0, None)]
    #[case(-3, None)]
    fn test_reference_base_bounds(#[case] position: i64, #[case] expected: Option<u8>) {
        let reference = InMemoryReference::new().with_sequence("chr1", b"acgtN");
        assert_eq!(reference_base(&reference, "chr1", position), expected);
    }

    #[test]
    fn test_unknown_chromosome() {
        let reference = InMemoryReference::new().with_sequence("chr1", b"ACGT");
        assert_eq!(reference_base(&reference, "chr2", 1), None);
        assert_eq!(reference_base(&NoReference, "chr1", 1), None);
    }

    #[test]
    fn test_in_memory_lookup() {
        let mut reference = InMemoryReference::new();
        assert!(reference.is_empty());
        reference.insert("chrM", b"GATC".to_vec());
        assert_eq!(reference.len(), 1);
        assert_eq!(reference.chromosome_length("chrM"), Some(4));
        assert_eq!(reference.base_at("chrM", 1), Some(b'G'));
        assert_eq!(reference.base_at("chrM", 0), None);
    }
}
