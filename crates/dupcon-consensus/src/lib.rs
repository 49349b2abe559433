#![deny(unsafe_code)]

//! Consensus calling for groups of duplicate fragments.
//!
//! This crate provides:
//! - [`fragment`]: the aligned [`Fragment`] input and the [`ConsensusRead`] output
//! - [`cursor`]: the [`ReadCursor`] that walks one fragment column by column
//! - [`base_caller`]: per-column single- and dual-strand voting
//! - [`indel`]: the [`IndelReconciler`] for groups whose members carry insertions or deletions
//! - [`assembler`]: the [`ConsensusAssembler`] that turns a group into one consensus read
//! - [`group_id`]: the shared [`GroupIdAllocator`]
//! - [`reference`]: the [`ReferenceBases`] seam used for tie-breaking and mutation counts

pub mod assembler;
pub mod base_caller;
pub mod builder;
pub mod cigar;
pub mod cursor;
pub mod fragment;
pub mod group_id;
pub mod indel;
pub mod reference;
pub mod state;

pub use assembler::{ConsensusAssembler, ConsensusOptions};
pub use base_caller::{BaseConsensusCaller, ColumnCall, ColumnObservations, call_column};
pub use builder::FragmentBuilder;
pub use cursor::{Direction, ReadCursor};
pub use fragment::{ConsensusRead, Fragment, MateInfo};
pub use group_id::{GroupIdAllocator, MAX_GROUP_ID};
pub use indel::{IndelReconciler, ReconcileFailure};
pub use reference::{InMemoryReference, NoReference, ReferenceBases};
pub use state::{ConsensusColumns, ConsensusState};

pub use dupcon_metrics::{ConsensusOutcome, ConsensusStatistics};
