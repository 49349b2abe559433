//! Utilities for generating SAM records programmatically.

#![allow(dead_code)]

use std::num::NonZeroUsize;

use bstr::BString;
use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::cigar::op::{Kind, Op};
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record::{Flags, MappingQuality};
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::{Cigar, Data, QualityScores, Sequence};
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::ReferenceSequence;

use dupcon_consensus::cigar::parse_cigar;
use dupcon_lib::sam::{BARCODE_TAG, MATE_CIGAR_TAG};

/// Header with `chr1` and `chr2`, each 1 Mb long.
pub fn create_header() -> Header {
    let length = NonZeroUsize::new(1_000_000).expect("non-zero");
    Header::builder()
        .add_reference_sequence("chr1", Map::<ReferenceSequence>::new(length))
        .add_reference_sequence("chr2", Map::<ReferenceSequence>::new(length))
        .build()
}

/// One mapped single-end record on `chr1`.
pub fn create_record(
    name: &str,
    barcode: &str,
    start: usize,
    cigar: &str,
    sequence: &str,
    qualities: &[u8],
) -> RecordBuf {
    let ops = parse_cigar(cigar).expect("valid cigar");
    let data: Data = [(Tag::from(BARCODE_TAG), Value::from(barcode))].into_iter().collect();
    RecordBuf::builder()
        .set_name(BString::from(name))
        .set_flags(Flags::empty())
        .set_reference_sequence_id(0)
        .set_alignment_start(Position::new(start).expect("non-zero start"))
        .set_mapping_quality(MappingQuality::new(60).expect("valid mapq"))
        .set_cigar(Cigar::from(ops))
        .set_sequence(Sequence::from(sequence.as_bytes().to_vec()))
        .set_quality_scores(QualityScores::from(qualities.to_vec()))
        .set_data(data)
        .build()
}

/// One mapped single-end record on the reverse strand of `chr1`.
pub fn create_reverse_record(
    name: &str,
    barcode: &str,
    start: usize,
    cigar: &str,
    sequence: &str,
    qualities: &[u8],
) -> RecordBuf {
    let mut record = create_record(name, barcode, start, cigar, sequence, qualities);
    *record.flags_mut() = Flags::REVERSE_COMPLEMENTED;
    record
}

/// A barcode family of `depth` identical single-end reads at `chr1:100`.
pub fn create_family(
    barcode: &str,
    depth: usize,
    base_name: &str,
    sequence: &str,
    quality: u8,
) -> Vec<RecordBuf> {
    (0..depth)
        .map(|i| {
            let name = format!("{base_name}:{i}:{barcode}");
            let quals = vec![quality; sequence.len()];
            let cigar = format!("{}M", sequence.len());
            create_record(&name, barcode, 100, &cigar, sequence, &quals)
        })
        .collect()
}

/// The first read of an FR pair: R1 at `r1_start` and R2 at `r2_start`, both `len`M.
///
/// With `top_strand` R1 is forward and R2 reverse; otherwise R1 is reverse and R2
/// forward, which is the other strand of the same duplex molecule.
pub fn create_pair_read(
    name: &str,
    barcode: &str,
    r1_start: usize,
    r2_start: usize,
    sequence: &str,
    top_strand: bool,
) -> RecordBuf {
    let len = sequence.len();
    let (start, mate_start) = if top_strand { (r1_start, r2_start) } else { (r2_start, r1_start) };
    let mut flags = Flags::SEGMENTED | Flags::FIRST_SEGMENT;
    if top_strand {
        flags |= Flags::MATE_REVERSE_COMPLEMENTED;
    } else {
        flags |= Flags::REVERSE_COMPLEMENTED;
    }

    let data: Data = [
        (Tag::from(BARCODE_TAG), Value::from(barcode)),
        (Tag::from(MATE_CIGAR_TAG), Value::from(format!("{len}M"))),
    ]
    .into_iter()
    .collect();

    RecordBuf::builder()
        .set_name(BString::from(name))
        .set_flags(flags)
        .set_reference_sequence_id(0)
        .set_alignment_start(Position::new(start).expect("non-zero start"))
        .set_mapping_quality(MappingQuality::new(60).expect("valid mapq"))
        .set_cigar(Cigar::from(vec![Op::new(Kind::Match, len)]))
        .set_sequence(Sequence::from(sequence.as_bytes().to_vec()))
        .set_quality_scores(QualityScores::from(vec![30u8; len]))
        .set_mate_reference_sequence_id(0)
        .set_mate_alignment_start(Position::new(mate_start).expect("non-zero start"))
        .set_data(data)
        .build()
}
