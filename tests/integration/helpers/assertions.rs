//! Custom assertion helpers for integration tests.

#![allow(dead_code)]

use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;

/// Asserts that a record has a specific MI (group id) tag value.
///
/// # Panics
///
/// Panics if the MI tag is missing or has unexpected value.
pub fn assert_mi_tag(record: &RecordBuf, expected: &str) {
    let value = record.data().get(&Tag::from([b'M', b'I'])).expect("Record should have MI tag");
    match value {
        Value::String(s) => {
            let s_bytes: &[u8] = s.as_ref();
            assert_eq!(s_bytes, expected.as_bytes(), "MI tag mismatch for {:?}", record.name());
        }
        _ => panic!("MI tag should be a string"),
    }
}

/// Returns an integer tag value widened to `i64`.
///
/// # Panics
///
/// Panics if the tag is missing or not an integer.
pub fn int_tag(record: &RecordBuf, tag: [u8; 2]) -> i64 {
    match record.data().get(&Tag::from(tag)) {
        Some(Value::Int8(v)) => i64::from(*v),
        Some(Value::Int16(v)) => i64::from(*v),
        Some(Value::Int32(v)) => i64::from(*v),
        Some(Value::UInt8(v)) => i64::from(*v),
        Some(Value::UInt16(v)) => i64::from(*v),
        Some(Value::UInt32(v)) => i64::from(*v),
        other => panic!("expected integer tag {}, got {other:?}", String::from_utf8_lossy(&tag)),
    }
}

/// Asserts that every quality score equals `expected`.
///
/// # Panics
///
/// Panics on the first differing score.
pub fn assert_uniform_quality(record: &RecordBuf, expected: u8) {
    let quals: &[u8] = record.quality_scores().as_ref();
    assert!(
        quals.iter().all(|&q| q == expected),
        "expected all qualities {expected} for {:?}, got {quals:?}",
        record.name()
    );
}
