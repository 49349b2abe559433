//! Read model for duplicate groups: input fragments and the consensus read built from them.

use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record_buf::Data;

use dupcon_umi::Barcoded;

use crate::cigar;

/// Mate-side alignment metadata of a paired fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MateInfo {
    pub chromosome: String,
    /// 1-based mate alignment start
    pub alignment_start: i64,
    /// Mate CIGAR (`MC`), when known
    pub cigar: Option<Vec<Op>>,
}

impl MateInfo {
    /// Soft-clipped bases in the mate CIGAR; zero when the CIGAR is unknown.
    #[must_use]
    pub fn soft_clipped_bases(&self) -> usize {
        self.cigar.as_deref().map_or(0, cigar::soft_clipped_bases)
    }
}

/// One aligned read observation belonging to a duplicate group.
///
/// Immutable once built; construct with [`crate::builder::FragmentBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub(crate) name: String,
    pub(crate) barcode: String,
    pub(crate) coordinate_key: String,
    pub(crate) flags: Flags,
    pub(crate) chromosome: String,
    pub(crate) alignment_start: i64,
    pub(crate) mapping_quality: u8,
    pub(crate) cigar: Vec<Op>,
    pub(crate) bases: Vec<u8>,
    pub(crate) quals: Vec<u8>,
    pub(crate) mate: Option<MateInfo>,
    pub(crate) template_length: i32,
    pub(crate) data: Data,
}

impl Fragment {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    #[must_use]
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// 1-based position of the first aligned base.
    #[must_use]
    pub fn alignment_start(&self) -> i64 {
        self.alignment_start
    }

    #[must_use]
    pub fn mapping_quality(&self) -> u8 {
        self.mapping_quality
    }

    #[must_use]
    pub fn cigar(&self) -> &[Op] {
        &self.cigar
    }

    #[must_use]
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    #[must_use]
    pub fn quals(&self) -> &[u8] {
        &self.quals
    }

    #[must_use]
    pub fn mate(&self) -> Option<&MateInfo> {
        self.mate.as_ref()
    }

    #[must_use]
    pub fn template_length(&self) -> i32 {
        self.template_length
    }

    #[must_use]
    pub fn data(&self) -> &Data {
        &self.data
    }

    #[must_use]
    pub fn is_unmapped(&self) -> bool {
        self.flags.is_unmapped() || self.cigar.is_empty()
    }

    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.flags.is_reverse_complemented()
    }

    #[must_use]
    pub fn is_first_of_pair(&self) -> bool {
        self.flags.is_first_segment()
    }

    #[must_use]
    pub fn has_indel(&self) -> bool {
        cigar::has_indel(&self.cigar)
    }

    /// 1-based position of the last aligned base.
    #[must_use]
    pub fn alignment_end(&self) -> i64 {
        self.alignment_start + cigar::reference_length(&self.cigar) as i64 - 1
    }

    /// Alignment start extended over leading soft clips.
    #[must_use]
    pub fn unclipped_start(&self) -> i64 {
        self.alignment_start - cigar::leading_soft_clip(&self.cigar) as i64
    }

    /// Alignment end extended over trailing soft clips.
    #[must_use]
    pub fn unclipped_end(&self) -> i64 {
        self.alignment_end() + cigar::trailing_soft_clip(&self.cigar) as i64
    }

    /// Unclipped start extended over insertions before the first aligned base.
    #[must_use]
    pub fn padded_start(&self) -> i64 {
        self.unclipped_start() - cigar::leading_edge_insertion(&self.cigar) as i64
    }

    /// Unclipped end extended over insertions after the last aligned base.
    #[must_use]
    pub fn padded_end(&self) -> i64 {
        self.unclipped_end() + cigar::trailing_edge_insertion(&self.cigar) as i64
    }

    #[must_use]
    pub fn aligned_base_count(&self) -> usize {
        cigar::aligned_bases(&self.cigar)
    }

    /// Mean base quality; zero for a read without bases.
    #[must_use]
    pub fn mean_base_quality(&self) -> f64 {
        if self.quals.is_empty() {
            return 0.0;
        }
        let total: u64 = self.quals.iter().map(|&q| u64::from(q)).sum();
        total as f64 / self.quals.len() as f64
    }
}

impl Barcoded for Fragment {
    fn barcode(&self) -> &str {
        &self.barcode
    }

    fn coordinate_key(&self) -> &str {
        &self.coordinate_key
    }
}

/// The single read synthesized (or copied) for a duplicate group.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusRead {
    pub name: String,
    pub flags: Flags,
    pub chromosome: String,
    /// 1-based alignment start
    pub alignment_start: i64,
    pub mapping_quality: u8,
    pub cigar: Vec<Op>,
    pub bases: Vec<u8>,
    pub quals: Vec<u8>,
    pub mate: Option<MateInfo>,
    pub template_length: i32,
    /// Auxiliary data copied from the first member
    pub data: Data,
    /// Zero-padded group identifier embedded in the name
    pub group_id: String,
    /// Members that contributed to the read
    pub read_count: usize,
    /// Inserted, deleted and reference-mismatching bases
    pub num_mutations: usize,
}

impl ConsensusRead {
    /// Verbatim copy of `fragment`, renamed, with the duplicate flag cleared.
    #[must_use]
    pub fn copy_of(fragment: &Fragment, name: String, group_id: &str, read_count: usize) -> Self {
        let mut flags = fragment.flags;
        flags.remove(Flags::DUPLICATE);
        Self {
            name,
            flags,
            chromosome: fragment.chromosome.clone(),
            alignment_start: fragment.alignment_start,
            mapping_quality: fragment.mapping_quality,
            cigar: fragment.cigar.clone(),
            bases: fragment.bases.clone(),
            quals: fragment.quals.clone(),
            mate: fragment.mate.clone(),
            template_length: fragment.template_length,
            data: fragment.data.clone(),
            group_id: group_id.to_string(),
            read_count,
            num_mutations: 0,
        }
    }
}
