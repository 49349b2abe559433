//! SAM record adapters for the consensus read model.
//!
//! The consensus crates work on [`dupcon_consensus::Fragment`]s and produce
//! [`dupcon_consensus::ConsensusRead`]s; this module converts to and from noodles
//! [`RecordBuf`](noodles::sam::alignment::RecordBuf)s and derives the duplicate coordinate
//! key used to bucket fragments before barcode clustering.
//!
//! # Tags
//!
//! - `RX` (default barcode tag, configurable) is read as the fragment barcode
//! - `MC` supplies the mate CIGAR
//! - `MI`, `cD` and `NM` are written on consensus reads: group id, contributing read
//!   count and mutation count

pub mod record_utils;

pub use record_utils::{
    consensus_to_record, duplicate_coordinate_key, fragment_from_record, fragments_from_records,
};

use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::Data;
use noodles::sam::alignment::record_buf::data::field::Value as BufValue;

/// Default tag holding the molecular barcode.
pub const BARCODE_TAG: [u8; 2] = *b"RX";

/// Mate CIGAR.
pub const MATE_CIGAR_TAG: [u8; 2] = *b"MC";

/// Consensus group identifier.
pub const GROUP_ID_TAG: [u8; 2] = *b"MI";

/// Number of reads that contributed to a consensus read.
pub const READ_COUNT_TAG: [u8; 2] = *b"cD";

/// Edit distance to the reference.
pub const MUTATION_COUNT_TAG: [u8; 2] = *b"NM";

/// Coordinate key given to unmapped records.
pub const UNMAPPED_KEY: &str = "*";

/// Returns a string-valued tag, or `None` if absent or not a string.
#[must_use]
pub fn string_tag(data: &Data, tag: [u8; 2]) -> Option<String> {
    match data.get(&Tag::from(tag))? {
        BufValue::String(s) => Some(s.to_string()),
        _ => None,
    }
}

/// Converts an integer to the smallest signed `BufValue` that holds it.
///
/// # Examples
///
/// ```
/// use dupcon_lib::sam::to_smallest_signed_int;
/// use noodles::sam::alignment::record_buf::data::field::Value;
///
/// assert_eq!(to_smallest_signed_int(60), Value::Int8(60));
/// assert_eq!(to_smallest_signed_int(1000), Value::Int16(1000));
/// ```
#[must_use]
pub fn to_smallest_signed_int(value: i32) -> BufValue {
    if let Ok(v) = i8::try_from(value) {
        BufValue::Int8(v)
    } else if let Ok(v) = i16::try_from(value) {
        BufValue::Int16(v)
    } else {
        BufValue::Int32(value)
    }
}
