//! Integration tests for the dupcon library.
//!
//! These tests run records through conversion, clustering, consensus calling and back,
//! checking the end-to-end behaviour across crates.

mod helpers;
mod test_clustering;
mod test_consensus_scenarios;
mod test_group_ids;
mod test_reference_pipeline;
