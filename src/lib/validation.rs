//! Validation of options and inputs before processing starts.
//!
//! Errors use the structured types from [`crate::errors`].

use std::fmt::Display;
use std::path::Path;

use dupcon_consensus::ConsensusOptions;
use dupcon_umi::ClusterOptions;

use crate::errors::{DupconError, Result};
use crate::pipeline::PipelineOptions;

/// Validate that a file exists
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use dupcon_lib::validation::validate_file_exists;
///
/// assert!(validate_file_exists("/nonexistent/ref.fa", "Reference").is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(DupconError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that a SAM tag is exactly 2 characters, returning its bytes
///
/// # Errors
/// Returns an error if the tag is not exactly 2 characters
///
/// # Example
/// ```
/// use dupcon_lib::validation::validate_tag;
///
/// assert_eq!(validate_tag("RX", "barcode tag").unwrap(), [b'R', b'X']);
/// assert!(validate_tag("RXX", "barcode tag").is_err());
/// ```
pub fn validate_tag(tag: &str, name: &str) -> Result<[u8; 2]> {
    match tag.as_bytes() {
        &[a, b] => Ok([a, b]),
        _ => Err(DupconError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Tag must be exactly 2 characters, got: '{tag}'"),
        }),
    }
}

/// Validate that a value is strictly positive
///
/// # Errors
/// Returns an error if `value <= 0`
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(DupconError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be positive (> 0), got: {value}"),
        });
    }
    Ok(())
}

fn invalid(parameter: &str, reason: impl Into<String>) -> DupconError {
    DupconError::InvalidParameter { parameter: parameter.to_string(), reason: reason.into() }
}

/// Validate barcode clustering options
///
/// # Errors
/// Returns an error if the duplex delimiter is empty or contains non-printable characters,
/// or if canonical barcodes are empty, of mixed lengths, or contain the delimiter.
pub fn validate_cluster_options(options: &ClusterOptions) -> Result<()> {
    if let Some(delimiter) = &options.duplex_delimiter {
        if delimiter.is_empty() {
            return Err(invalid("duplex-delimiter", "must not be empty"));
        }
        if !delimiter.chars().all(|c| c.is_ascii_graphic()) {
            return Err(invalid(
                "duplex-delimiter",
                format!("must contain only printable characters, got: {delimiter:?}"),
            ));
        }
    }

    if let Some(canonical) = &options.canonical_barcodes {
        let mut lengths = canonical.iter().map(String::len);
        if let Some(first) = lengths.next() {
            if first == 0 {
                return Err(invalid("canonical-barcodes", "barcodes must not be empty"));
            }
            if lengths.any(|len| len != first) {
                return Err(invalid("canonical-barcodes", "all barcodes must have the same length"));
            }
        }
        if let Some(delimiter) = &options.duplex_delimiter {
            if let Some(barcode) = canonical.iter().find(|b| b.contains(delimiter.as_str())) {
                return Err(invalid(
                    "canonical-barcodes",
                    format!("barcode '{barcode}' contains the duplex delimiter '{delimiter}'"),
                ));
            }
        }
    }

    if options.reversed_key_marker.is_empty() {
        return Err(invalid("reversed-key-marker", "must not be empty"));
    }
    Ok(())
}

/// Validate consensus options
///
/// # Errors
/// Returns an error if the read depth cap is zero, the read name prefix is empty, or the
/// name delimiter is whitespace.
pub fn validate_consensus_options(options: &ConsensusOptions) -> Result<()> {
    if let Some(depth) = options.max_read_depth {
        validate_positive(depth, "max-read-depth")?;
    }
    if options.read_name_prefix.is_empty() {
        return Err(invalid("read-name-prefix", "must not be empty"));
    }
    if options.name_delimiter.is_whitespace() {
        return Err(invalid("name-delimiter", "must not be whitespace"));
    }
    Ok(())
}

/// Validate all pipeline options
///
/// # Errors
/// Returns the first error from the thread count, clustering or consensus options.
pub fn validate_pipeline_options(options: &PipelineOptions) -> Result<()> {
    validate_positive(options.threads, "threads")?;
    validate_cluster_options(&options.cluster)?;
    validate_consensus_options(&options.consensus)
}
