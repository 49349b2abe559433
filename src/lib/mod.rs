#![deny(unsafe_code)]
// Clippy lint configuration for CI
// - cast_*: counts and positions move between signed and unsigned integer types
// - missing_*_doc: documentation improvements tracked separately
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! # dupcon - duplicate-fragment consensus
//!
//! Collapses duplicate sequencing fragments into one consensus read per original
//! molecule. Fragments sharing a coordinate key are clustered by molecular barcode,
//! and every cluster is voted column by column into a single read.
//!
//! ## Crates
//!
//! - [`dupcon_umi`] - barcode clustering ([`BarcodeClusterer`])
//! - [`dupcon_consensus`] - per-group consensus ([`ConsensusAssembler`], [`IndelReconciler`])
//! - [`dupcon_metrics`] - outcomes, statistics and TSV metrics
//!
//! ## Modules
//!
//! - **[`pipeline`]** - parallel driver over independent groups
//! - **[`sam`]** - conversion between noodles records and fragments
//! - **[`reference`][mod@reference]** - FASTA-backed reference bases
//! - **[`validation`]** - option validation
//! - **[`logging`]** - summary logging and formatting
//! - **[`errors`]** - typed errors
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use dupcon_lib::pipeline::{ConsensusPipeline, PipelineOptions};
//! use dupcon_lib::{FragmentBuilder, GroupIdAllocator, NoReference};
//!
//! # fn main() -> anyhow::Result<()> {
//! let fragments = vec![
//!     FragmentBuilder::new("q1:AAAA").barcode("AAAA").coordinate_key("chr1:100").bases("ACGT").build(),
//!     FragmentBuilder::new("q2:AAAT").barcode("AAAT").coordinate_key("chr1:100").bases("ACGT").build(),
//! ];
//! let pipeline = ConsensusPipeline::new(
//!     Arc::new(NoReference),
//!     PipelineOptions::default(),
//!     Arc::new(GroupIdAllocator::new()),
//! )?;
//! let output = pipeline.cluster_and_build(&fragments);
//! assert_eq!(output.consensus.len(), 1);
//! assert_eq!(output.consensus[0].read.name, "q1:CNS_000001");
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod reference;
pub mod sam;
pub mod validation;

pub use dupcon_consensus::{
    ConsensusAssembler, ConsensusOptions, ConsensusRead, Fragment, FragmentBuilder,
    GroupIdAllocator, IndelReconciler, InMemoryReference, MateInfo, NoReference, ReferenceBases,
};
pub use dupcon_metrics::{ConsensusMetrics, ConsensusOutcome, ConsensusStatistics};
pub use dupcon_umi::{BarcodeClusterer, ClusterOptions, DuplicateGroup};

pub use errors::{DupconError, Result};
