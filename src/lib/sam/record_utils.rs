//! Conversion between noodles [`RecordBuf`]s and the consensus read model.

use anyhow::Result;
use bstr::BString;
use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::MappingQuality;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::{Cigar, QualityScores, Sequence};

use dupcon_consensus::cigar::{cigar_to_string, parse_cigar, read_length, reference_length};
use dupcon_consensus::{ConsensusRead, Fragment, FragmentBuilder, MateInfo};

use super::{
    GROUP_ID_TAG, MATE_CIGAR_TAG, MUTATION_COUNT_TAG, READ_COUNT_TAG, UNMAPPED_KEY, string_tag,
    to_smallest_signed_int,
};
use crate::errors::DupconError;
use crate::validation::validate_tag;

fn reference_name(header: &Header, id: Option<usize>) -> Result<String> {
    let Some(id) = id else {
        return Ok(UNMAPPED_KEY.to_string());
    };
    header
        .reference_sequences()
        .get_index(id)
        .map(|(name, _)| name.to_string())
        .ok_or_else(|| DupconError::ReferenceNotFound { ref_name: format!("#{id}") }.into())
}

fn reference_id(header: &Header, name: &str) -> Result<Option<usize>> {
    if name == UNMAPPED_KEY {
        return Ok(None);
    }
    header
        .reference_sequences()
        .get_index_of(name.as_bytes())
        .map(Some)
        .ok_or_else(|| DupconError::ReferenceNotFound { ref_name: name.to_string() }.into())
}

fn position(pos: i64) -> Option<Position> {
    usize::try_from(pos).ok().and_then(Position::new)
}

fn start_of(pos: Option<Position>) -> i64 {
    pos.map_or(0, |p| usize::from(p) as i64)
}

fn clipping(ops: impl Iterator<Item = Op>) -> i64 {
    ops.take_while(|op| matches!(op.kind(), Kind::SoftClip | Kind::HardClip))
        .map(|op| op.len() as i64)
        .sum()
}

/// Unclipped 5' position: the unclipped start for forward reads, the unclipped end otherwise.
fn five_prime_position(start: i64, ops: &[Op], reverse: bool) -> i64 {
    if reverse {
        start + reference_length(ops) as i64 - 1 + clipping(ops.iter().rev().copied())
    } else {
        start - clipping(ops.iter().copied())
    }
}

/// Key shared by all fragments that may be duplicates of one another.
///
/// Paired reads use the unclipped 5' positions of both ends, lowest first, so both reads of
/// a pair get the same key. When the first-of-pair read is reverse-complemented the key is
/// suffixed with `reversed_marker`, so the two strands of one duplex molecule differ only
/// by that suffix. Unpaired reads (or reads whose mate is unmapped) use their own 5'
/// position and strand. Unmapped reads all share [`UNMAPPED_KEY`].
///
/// # Errors
///
/// Returns an error if the record refers to a reference sequence missing from `header`.
pub fn duplicate_coordinate_key(
    record: &RecordBuf,
    header: &Header,
    reversed_marker: &str,
) -> Result<String> {
    let flags = record.flags();
    if flags.is_unmapped() {
        return Ok(UNMAPPED_KEY.to_string());
    }

    let chrom = reference_name(header, record.reference_sequence_id())?;
    let own = five_prime_position(
        start_of(record.alignment_start()),
        record.cigar().as_ref(),
        flags.is_reverse_complemented(),
    );

    if !flags.is_segmented() || flags.is_mate_unmapped() {
        let strand = if flags.is_reverse_complemented() { '-' } else { '+' };
        return Ok(format!("{chrom}:{own}:{strand}"));
    }

    let mate_chrom = reference_name(header, record.mate_reference_sequence_id())?;
    let mate_start = start_of(record.mate_alignment_start());
    let mate = match string_tag(record.data(), MATE_CIGAR_TAG).and_then(|s| parse_cigar(&s)) {
        Some(ops) if !ops.is_empty() => {
            five_prime_position(mate_start, &ops, flags.is_mate_reverse_complemented())
        }
        _ => mate_start,
    };

    let (low, high) = if (chrom.as_str(), own) <= (mate_chrom.as_str(), mate) {
        ((chrom.as_str(), own), (mate_chrom.as_str(), mate))
    } else {
        ((mate_chrom.as_str(), mate), (chrom.as_str(), own))
    };
    let mut key = format!("{}:{}:{}:{}", low.0, low.1, high.0, high.1);

    let first_reversed = if flags.is_first_segment() {
        flags.is_reverse_complemented()
    } else {
        flags.is_mate_reverse_complemented()
    };
    if first_reversed {
        key.push_str(reversed_marker);
    }
    Ok(key)
}

/// Builds a [`Fragment`] from a record.
///
/// The barcode is read from `barcode_tag`, the mate CIGAR from `MC`, and the coordinate key
/// from [`duplicate_coordinate_key`]. A missing mapping quality reads as zero.
///
/// # Errors
///
/// Returns [`DupconError::InvalidRecord`] when the barcode tag is missing, base qualities
/// are absent, or the CIGAR does not match the sequence length, and
/// [`DupconError::ReferenceNotFound`] for reference ids missing from `header`.
pub fn fragment_from_record(
    record: &RecordBuf,
    header: &Header,
    barcode_tag: [u8; 2],
    reversed_marker: &str,
) -> Result<Fragment> {
    let name = record.name().map_or_else(|| "*".to_string(), ToString::to_string);
    let invalid = |reason: String| DupconError::InvalidRecord { name: name.clone(), reason };

    let barcode = string_tag(record.data(), barcode_tag).ok_or_else(|| {
        invalid(format!("missing {} tag", String::from_utf8_lossy(&barcode_tag)))
    })?;

    let bases: &[u8] = record.sequence().as_ref();
    let quals: &[u8] = record.quality_scores().as_ref();
    if quals.len() != bases.len() {
        return Err(invalid(format!(
            "{} bases but {} base qualities",
            bases.len(),
            quals.len()
        ))
        .into());
    }

    let flags = record.flags();
    let cigar: Vec<Op> = record.cigar().as_ref().to_vec();
    if !cigar.is_empty() && read_length(&cigar) != bases.len() {
        return Err(invalid(format!(
            "CIGAR {} does not match {} bases",
            cigar_to_string(&cigar),
            bases.len()
        ))
        .into());
    }

    let mate = if flags.is_segmented() && !flags.is_mate_unmapped() {
        Some(MateInfo {
            chromosome: reference_name(header, record.mate_reference_sequence_id())?,
            alignment_start: start_of(record.mate_alignment_start()),
            cigar: string_tag(record.data(), MATE_CIGAR_TAG).and_then(|s| parse_cigar(&s)),
        })
    } else {
        None
    };

    let fragment = FragmentBuilder::new(&name)
        .barcode(&barcode)
        .coordinate_key(&duplicate_coordinate_key(record, header, reversed_marker)?)
        .flags(flags)
        .chromosome(&reference_name(header, record.reference_sequence_id())?)
        .start(start_of(record.alignment_start()))
        .mapping_quality(record.mapping_quality().map_or(0, |mq| mq.get()))
        .cigar_ops(cigar)
        .base_bytes(bases.to_vec())
        .quals(quals)
        .mate_info(mate)
        .template_length(record.template_length())
        .data(record.data().clone())
        .build();
    Ok(fragment)
}

/// Converts every record with [`fragment_from_record`], reading the barcode from the
/// two-character tag name `barcode_tag`.
///
/// # Errors
///
/// Returns an error if `barcode_tag` is not two characters or any record fails to convert.
pub fn fragments_from_records<'r, I>(
    records: I,
    header: &Header,
    barcode_tag: &str,
    reversed_marker: &str,
) -> Result<Vec<Fragment>>
where
    I: IntoIterator<Item = &'r RecordBuf>,
{
    let tag = validate_tag(barcode_tag, "barcode-tag")?;
    records
        .into_iter()
        .map(|record| fragment_from_record(record, header, tag, reversed_marker))
        .collect()
}

/// Builds a record for a consensus read, adding `MI`, `cD`, `NM` and `MC` tags.
///
/// # Errors
///
/// Returns [`DupconError::ReferenceNotFound`] if the read or its mate is placed on a
/// reference sequence missing from `header`.
pub fn consensus_to_record(read: &ConsensusRead, header: &Header) -> Result<RecordBuf> {
    let mut data = read.data.clone();
    data.insert(Tag::from(GROUP_ID_TAG), Value::from(read.group_id.as_str()));
    data.insert(
        Tag::from(READ_COUNT_TAG),
        to_smallest_signed_int(i32::try_from(read.read_count).unwrap_or(i32::MAX)),
    );
    if !read.cigar.is_empty() {
        data.insert(
            Tag::from(MUTATION_COUNT_TAG),
            to_smallest_signed_int(i32::try_from(read.num_mutations).unwrap_or(i32::MAX)),
        );
    }

    let mut builder = RecordBuf::builder()
        .set_name(BString::from(read.name.as_str()))
        .set_flags(read.flags)
        .set_cigar(Cigar::from(read.cigar.clone()))
        .set_sequence(Sequence::from(read.bases.clone()))
        .set_quality_scores(QualityScores::from(read.quals.clone()))
        .set_template_length(read.template_length);

    if let Some(id) = reference_id(header, &read.chromosome)? {
        builder = builder.set_reference_sequence_id(id);
    }
    if let Some(start) = position(read.alignment_start) {
        builder = builder.set_alignment_start(start);
    }
    if let Some(mapq) = MappingQuality::new(read.mapping_quality) {
        builder = builder.set_mapping_quality(mapq);
    }

    if let Some(mate) = &read.mate {
        if let Some(id) = reference_id(header, &mate.chromosome)? {
            builder = builder.set_mate_reference_sequence_id(id);
        }
        if let Some(start) = position(mate.alignment_start) {
            builder = builder.set_mate_alignment_start(start);
        }
        if let Some(cigar) = &mate.cigar {
            data.insert(Tag::from(MATE_CIGAR_TAG), Value::from(cigar_to_string(cigar)));
        }
    }

    Ok(builder.set_data(data).build())
}
