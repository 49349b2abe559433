//! Custom error types for dupcon operations.

use thiserror::Error;

/// Result type alias for dupcon operations
pub type Result<T> = std::result::Result<T, DupconError>;

/// Error type for dupcon operations
#[derive(Error, Debug)]
pub enum DupconError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "FASTA", "metrics")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Required reference sequence not found
    #[error("Reference sequence '{ref_name}' not found")]
    ReferenceNotFound {
        /// The reference sequence name
        ref_name: String,
    },

    /// A record that cannot be converted to or from the read model
    #[error("Invalid record '{name}': {reason}")]
    InvalidRecord {
        /// The read name, or `*` when absent
        name: String,
        /// Explanation of the problem
        reason: String,
    },
}
