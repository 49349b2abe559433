#![deny(unsafe_code)]

//! Molecular barcode (UMI) clustering.
//!
//! This crate provides:
//! - [`distance`]: Hamming distance helpers that never compare barcodes of unequal length
//! - [`clusterer`]: the [`BarcodeClusterer`] that groups fragments into [`DuplicateGroup`]s

pub mod clusterer;
pub mod distance;

pub use clusterer::{Barcoded, BarcodeClusterer, ClusterOptions, DuplicateGroup};
pub use distance::{count_mismatches, exceeds_diff, matches_within_threshold};
