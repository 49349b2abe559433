//! Fluent construction of [`Fragment`]s.
//!
//! Used by record conversion and throughout the tests:
//!
//! ```
//! use dupcon_consensus::builder::FragmentBuilder;
//!
//! let fragment = FragmentBuilder::new("q1:AAAA")
//!     .barcode("AAAA")
//!     .start(100)
//!     .bases("ACGTACGT")
//!     .quals(&[30; 8])
//!     .first_of_pair()
//!     .build();
//! assert_eq!(fragment.alignment_end(), 107);
//! ```

use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record_buf::Data;

use crate::cigar::parse_cigar;
use crate::fragment::{Fragment, MateInfo};

/// Default base quality for builders without explicit qualities.
pub const DEFAULT_QUALITY: u8 = 30;

/// Default mapping quality for builders.
pub const DEFAULT_MAPQ: u8 = 60;

/// Builder for [`Fragment`].
///
/// Without an explicit CIGAR a mapped fragment is fully aligned (`<len>M`).
#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    name: String,
    barcode: String,
    coordinate_key: String,
    flags: Flags,
    chromosome: String,
    alignment_start: i64,
    mapping_quality: u8,
    cigar: Option<Vec<Op>>,
    bases: Vec<u8>,
    quals: Option<Vec<u8>>,
    mate: Option<MateInfo>,
    template_length: i32,
    data: Data,
}

impl FragmentBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            barcode: String::new(),
            coordinate_key: String::new(),
            flags: Flags::empty(),
            chromosome: "chr1".to_string(),
            alignment_start: 1,
            mapping_quality: DEFAULT_MAPQ,
            cigar: None,
            bases: Vec::new(),
            quals: None,
            mate: None,
            template_length: 0,
            data: Data::default(),
        }
    }

    #[must_use]
    pub fn barcode(mut self, barcode: &str) -> Self {
        self.barcode = barcode.to_string();
        self
    }

    #[must_use]
    pub fn coordinate_key(mut self, key: &str) -> Self {
        self.coordinate_key = key.to_string();
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn chromosome(mut self, chromosome: &str) -> Self {
        self.chromosome = chromosome.to_string();
        self
    }

    /// Sets the 1-based alignment start.
    #[must_use]
    pub fn start(mut self, start: i64) -> Self {
        self.alignment_start = start;
        self
    }

    #[must_use]
    pub fn mapping_quality(mut self, mapq: u8) -> Self {
        self.mapping_quality = mapq;
        self
    }

    /// Sets the CIGAR from a SAM string.
    ///
    /// # Panics
    ///
    /// Panics if the CIGAR string is malformed.
    #[must_use]
    pub fn cigar(mut self, cigar: &str) -> Self {
        self.cigar = Some(parse_cigar(cigar).unwrap_or_else(|| panic!("Invalid CIGAR: {cigar}")));
        self
    }

    #[must_use]
    pub fn cigar_ops(mut self, ops: Vec<Op>) -> Self {
        self.cigar = Some(ops);
        self
    }

    #[must_use]
    pub fn bases(mut self, bases: &str) -> Self {
        self.bases = bases.as_bytes().to_vec();
        self
    }

    #[must_use]
    pub fn base_bytes(mut self, bases: Vec<u8>) -> Self {
        self.bases = bases;
        self
    }

    #[must_use]
    pub fn quals(mut self, quals: &[u8]) -> Self {
        self.quals = Some(quals.to_vec());
        self
    }

    /// Marks the fragment as paired, first segment.
    #[must_use]
    pub fn first_of_pair(mut self) -> Self {
        self.flags.insert(Flags::SEGMENTED | Flags::FIRST_SEGMENT);
        self.flags.remove(Flags::LAST_SEGMENT);
        self
    }

    /// Marks the fragment as paired, last segment.
    #[must_use]
    pub fn second_of_pair(mut self) -> Self {
        self.flags.insert(Flags::SEGMENTED | Flags::LAST_SEGMENT);
        self.flags.remove(Flags::FIRST_SEGMENT);
        self
    }

    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.flags.insert(Flags::REVERSE_COMPLEMENTED);
        self
    }

    #[must_use]
    pub fn duplicate(mut self) -> Self {
        self.flags.insert(Flags::DUPLICATE);
        self
    }

    /// Marks the fragment unmapped and clears its alignment.
    #[must_use]
    pub fn unmapped(mut self) -> Self {
        self.flags.insert(Flags::UNMAPPED);
        self.cigar = Some(Vec::new());
        self.mapping_quality = 0;
        self
    }

    /// Sets mate metadata; `cigar` is the mate CIGAR string.
    ///
    /// # Panics
    ///
    /// Panics if the mate CIGAR string is malformed.
    #[must_use]
    pub fn mate(mut self, chromosome: &str, start: i64, cigar: Option<&str>) -> Self {
        let cigar =
            cigar.map(|c| parse_cigar(c).unwrap_or_else(|| panic!("Invalid mate CIGAR: {c}")));
        self.mate = Some(MateInfo { chromosome: chromosome.to_string(), alignment_start: start, cigar });
        self
    }

    #[must_use]
    pub fn mate_info(mut self, mate: Option<MateInfo>) -> Self {
        self.mate = mate;
        self
    }

    #[must_use]
    pub fn template_length(mut self, template_length: i32) -> Self {
        self.template_length = template_length;
        self
    }

    #[must_use]
    pub fn data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn build(self) -> Fragment {
        let len = self.bases.len();
        let cigar = self.cigar.unwrap_or_else(|| {
            if self.flags.is_unmapped() || len == 0 {
                Vec::new()
            } else {
                vec![Op::new(Kind::Match, len)]
            }
        });
        let quals = self.quals.unwrap_or_else(|| vec![DEFAULT_QUALITY; len]);

        Fragment {
            name: self.name,
            barcode: self.barcode,
            coordinate_key: self.coordinate_key,
            flags: self.flags,
            chromosome: self.chromosome,
            alignment_start: self.alignment_start,
            mapping_quality: self.mapping_quality,
            cigar,
            bases: self.bases,
            quals,
            mate: self.mate,
            template_length: self.template_length,
            data: self.data,
        }
    }
}
