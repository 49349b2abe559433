//! Barcode clustering across tolerance passes and duplex strands.

use std::sync::Arc;

use crate::helpers::{create_header, create_pair_read, create_record};
use dupcon_lib::pipeline::{ConsensusPipeline, PipelineOptions};
use dupcon_lib::sam::{BARCODE_TAG, fragment_from_record};
use dupcon_lib::{
    BarcodeClusterer, ClusterOptions, ConsensusOutcome, Fragment, GroupIdAllocator, NoReference,
};
use dupcon_umi::Barcoded;

fn fragments(barcodes: &[(&str, &str)]) -> Vec<Fragment> {
    let header = create_header();
    barcodes
        .iter()
        .map(|(name, barcode)| {
            let record = create_record(name, barcode, 100, "4M", "ACGT", &[30; 4]);
            fragment_from_record(&record, &header, BARCODE_TAG, "_R").expect("valid record")
        })
        .collect()
}

fn group_barcodes(options: ClusterOptions, fragments: &[Fragment]) -> Vec<Vec<String>> {
    BarcodeClusterer::new(options)
        .cluster(fragments)
        .into_iter()
        .map(|g| {
            let mut barcodes: Vec<String> =
                g.members().iter().map(|f| f.barcode().to_string()).collect();
            barcodes.sort();
            barcodes.dedup();
            barcodes
        })
        .collect()
}

#[test]
fn test_one_mismatch_merges_at_tolerance_one() {
    let input = fragments(&[("a", "AAAAA"), ("b", "AAAAA"), ("c", "AAAAT")]);
    let groups = group_barcodes(ClusterOptions::default(), &input);
    assert_eq!(groups, vec![vec!["AAAAA".to_string(), "AAAAT".to_string()]]);
}

#[test]
fn test_two_mismatches_merge_in_second_pass() {
    let input = fragments(&[("a", "AAAAA"), ("b", "AAATT")]);

    let strict = ClusterOptions { edit_distance: 0, ..ClusterOptions::default() };
    assert_eq!(group_barcodes(strict, &input).len(), 2);

    // AAAAA -> AAATT is two substitutions: beyond the directional pass at D=1 but within
    // the D+1 second pass
    let groups = group_barcodes(ClusterOptions::default(), &input);
    assert_eq!(groups, vec![vec!["AAAAA".to_string(), "AAATT".to_string()]]);
}

#[test]
fn test_unequal_lengths_never_merge() {
    let input = fragments(&[("a", "AAAAA"), ("b", "AAAA")]);
    let options = ClusterOptions { edit_distance: 3, ..ClusterOptions::default() };
    assert_eq!(group_barcodes(options, &input).len(), 2);
}

#[test]
fn test_different_coordinates_never_merge() {
    let header = create_header();
    let a = create_record("a", "AAAAA", 100, "4M", "ACGT", &[30; 4]);
    let b = create_record("b", "AAAAA", 500, "4M", "ACGT", &[30; 4]);
    let input: Vec<Fragment> = [a, b]
        .iter()
        .map(|r| fragment_from_record(r, &header, BARCODE_TAG, "_R").expect("valid record"))
        .collect();
    assert_eq!(group_barcodes(ClusterOptions::default(), &input).len(), 2);
}

#[test]
fn test_duplex_strands_pair_into_one_group() {
    let header = create_header();
    let records = vec![
        create_pair_read("top1", "AACC-GGTT", 100, 300, "ACGTACGT", true),
        create_pair_read("top2", "AACC-GGTT", 100, 300, "ACGTACGT", true),
        create_pair_read("bot1", "GGTT-AACC", 100, 300, "ACGTACGT", false),
    ];
    let input: Vec<Fragment> = records
        .iter()
        .map(|r| fragment_from_record(r, &header, BARCODE_TAG, "_R").expect("valid record"))
        .collect();
    assert_eq!(format!("{}_R", input[0].coordinate_key()), input[2].coordinate_key());

    let options = ClusterOptions { duplex_delimiter: Some("-".to_string()), ..ClusterOptions::default() };
    let groups = BarcodeClusterer::new(options.clone()).cluster(&input);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].is_duplex());
    assert_eq!(groups[0].len(), 3);

    let without_delimiter = BarcodeClusterer::new(ClusterOptions::default()).cluster(&input);
    assert_eq!(without_delimiter.len(), 2);

    let pipeline = ConsensusPipeline::new(
        Arc::new(NoReference),
        PipelineOptions { cluster: options, ..PipelineOptions::default() },
        Arc::new(GroupIdAllocator::new()),
    )
    .expect("valid options");
    let output = pipeline.cluster_and_build(&input);
    assert_eq!(output.consensus.len(), 1);
    assert_eq!(output.consensus[0].read.read_count, 3);
    assert_ne!(output.consensus[0].outcome, ConsensusOutcome::Unset);
}

#[test]
fn test_canonical_barcodes_group_exact_matches() {
    let input = fragments(&[("a", "AAAA"), ("b", "CCCC"), ("c", "AAAA"), ("d", "AAAT")]);
    let options = ClusterOptions {
        canonical_barcodes: Some(["AAAA", "CCCC"].iter().map(|b| (*b).to_string()).collect()),
        ..ClusterOptions::default()
    };
    let groups = group_barcodes(options, &input);
    assert_eq!(groups.len(), 2);
    assert!(groups.contains(&vec!["AAAA".to_string(), "AAAT".to_string()]));
    assert!(groups.contains(&vec!["CCCC".to_string()]));
}
