//! End-to-end consensus outcomes for single barcode families.

use std::sync::Arc;

use noodles::sam::alignment::RecordBuf;

use crate::helpers::{
    assert_mi_tag, assert_uniform_quality, create_family, create_header, create_record,
    create_reverse_record, init_logging, int_tag,
};
use dupcon_consensus::cigar::cigar_to_string;
use dupcon_lib::pipeline::{ConsensusPipeline, PipelineOptions, PipelineOutput};
use dupcon_lib::sam::{BARCODE_TAG, READ_COUNT_TAG, consensus_to_record, fragment_from_record};
use dupcon_lib::{ConsensusOutcome, Fragment, GroupIdAllocator, NoReference};

fn run(records: &[RecordBuf]) -> (PipelineOutput, Vec<RecordBuf>) {
    init_logging();
    let header = create_header();
    let fragments: Vec<Fragment> = records
        .iter()
        .map(|r| fragment_from_record(r, &header, BARCODE_TAG, "_R").expect("valid record"))
        .collect();

    let pipeline = ConsensusPipeline::new(
        Arc::new(NoReference),
        PipelineOptions::default(),
        Arc::new(GroupIdAllocator::new()),
    )
    .expect("valid options");
    let output = pipeline.cluster_and_build(&fragments);
    let out_records = output
        .consensus
        .iter()
        .map(|g| consensus_to_record(&g.read, &header).expect("convertible read"))
        .collect();
    (output, out_records)
}

#[test]
fn test_identical_family_keeps_input_qualities() {
    let records = create_family("ACGTACGT", 3, "inst", "ACGTTTGCAACG", 35);
    let (output, out) = run(&records);

    assert_eq!(output.consensus.len(), 1);
    assert_eq!(output.consensus[0].outcome, ConsensusOutcome::AlignmentOnly);
    assert_eq!(out[0].sequence().as_ref(), b"ACGTTTGCAACG");
    assert_uniform_quality(&out[0], 35);
    assert_mi_tag(&out[0], "000001");
    assert_eq!(int_tag(&out[0], READ_COUNT_TAG), 3);
    assert_eq!(
        out[0].name().map(ToString::to_string).as_deref(),
        Some("inst:0:CNS_000001")
    );
}

#[test]
fn test_single_difference_is_discounted() {
    let records = vec![
        create_record("a:AAAA", "AAAA", 100, "5M", "AAAAA", &[30, 30, 30, 30, 30]),
        create_record("b:AAAA", "AAAA", 100, "5M", "AACAA", &[30, 30, 20, 30, 30]),
    ];
    let (output, out) = run(&records);

    assert_eq!(output.consensus[0].outcome, ConsensusOutcome::AlignmentOnly);
    assert_eq!(out[0].sequence().as_ref(), b"AAAAA");
    let quals: &[u8] = out[0].quality_scores().as_ref();
    assert_eq!(quals, &[30, 30, 10, 30, 30]);
}

#[test]
fn test_conflicting_insertions_copy_best_member() {
    let records = vec![
        create_record("a:CCCC", "CCCC", 100, "3M1I3M", "ACGTACG", &[30; 7]),
        create_record("b:CCCC", "CCCC", 100, "5M1I1M", "ACGACTG", &[35; 7]),
    ];
    let (output, out) = run(&records);

    let group = &output.consensus[0];
    assert_eq!(group.outcome, ConsensusOutcome::IndelFail);
    assert!(!group.outcome.is_valid());
    assert_eq!(out[0].sequence().as_ref(), b"ACGACTG");
    assert_uniform_quality(&out[0], 35);
    assert_eq!(cigar_to_string(&group.read.cigar), "5M1I1M");
    assert_eq!(output.statistics.indel_fail, 1);
}

#[test]
fn test_majority_insertion_reconciled() {
    let records = vec![
        create_record("a:GGGG", "GGGG", 100, "3M1I3M", "ACGTACG", &[30; 7]),
        create_record("b:GGGG", "GGGG", 100, "3M1I3M", "ACGTACG", &[30; 7]),
        create_record("c:GGGG", "GGGG", 100, "6M", "ACGACG", &[30; 6]),
    ];
    let (output, out) = run(&records);

    let group = &output.consensus[0];
    assert_eq!(group.outcome, ConsensusOutcome::IndelMismatch);
    assert_eq!(cigar_to_string(&group.read.cigar), "3M1I3M");
    assert_eq!(out[0].sequence().as_ref(), b"ACGTACG");
    assert_eq!(group.read.alignment_start, 100);
}

#[test]
fn test_reverse_strand_family_aligned_only() {
    let records: Vec<RecordBuf> = (0..3)
        .map(|i| create_reverse_record(&format!("r{i}:TTAA"), "TTAA", 100, "2S6M", "GGACGTAC", &[30; 8]))
        .collect();
    let (output, out) = run(&records);

    let group = &output.consensus[0];
    assert_eq!(group.outcome, ConsensusOutcome::AlignmentOnly);
    assert_eq!(cigar_to_string(&group.read.cigar), "2S6M");
    assert_eq!(group.read.alignment_start, 100);
    assert_eq!(out[0].sequence().as_ref(), b"GGACGTAC");
    assert_uniform_quality(&out[0], 30);
    assert!(out[0].flags().is_reverse_complemented());
    assert_eq!(int_tag(&out[0], READ_COUNT_TAG), 3);
}

#[test]
fn test_reverse_strand_majority_insertion_reconciled() {
    let records = vec![
        create_reverse_record("a:GATC", "GATC", 100, "2M1I4M", "ACTGACG", &[30; 7]),
        create_reverse_record("b:GATC", "GATC", 100, "2M1I4M", "ACTGACG", &[30; 7]),
        create_reverse_record("c:GATC", "GATC", 100, "6M", "ACGACG", &[30; 6]),
    ];
    let (output, out) = run(&records);

    let group = &output.consensus[0];
    assert_eq!(group.outcome, ConsensusOutcome::IndelMismatch);
    assert_eq!(cigar_to_string(&group.read.cigar), "2M1I4M");
    assert_eq!(group.read.alignment_start, 100);
    assert_eq!(out[0].sequence().as_ref(), b"ACTGACG");
    assert!(out[0].flags().is_reverse_complemented());
    assert_eq!(output.statistics.indel_mismatch, 1);
}

#[test]
fn test_singleton_round_trips() {
    let records = vec![create_record("solo:TTTT", "TTTT", 250, "2S6M", "GGACGTAC", &[12, 14, 30, 31, 32, 33, 34, 35])];
    let (output, out) = run(&records);

    assert_eq!(output.consensus[0].outcome, ConsensusOutcome::Supplementary);
    assert_eq!(out[0].sequence(), records[0].sequence());
    assert_eq!(out[0].quality_scores(), records[0].quality_scores());
    assert_eq!(out[0].cigar(), records[0].cigar());
    assert_eq!(out[0].alignment_start(), records[0].alignment_start());
    assert_eq!(
        out[0].name().map(ToString::to_string).as_deref(),
        Some("solo:CNS_000001")
    );
}

#[test]
fn test_no_outcome_is_left_unset() {
    let mut records = create_family("AAAAAA", 4, "x", "ACGTACGT", 30);
    records.extend(create_family("CCCCCC", 1, "y", "ACGTACGT", 30));
    records.push(create_record("z:GGGGGG", "GGGGGG", 100, "4M1D4M", "ACGTACGT", &[30; 8]));
    records.push(create_record("w:GGGGGG", "GGGGGG", 100, "4M1D4M", "ACGTACGT", &[30; 8]));
    let (output, _) = run(&records);

    assert_eq!(output.consensus.len(), 3);
    assert!(output.consensus.iter().all(|g| g.outcome.is_terminal()));
    assert_eq!(output.statistics.groups, 3);
    assert_eq!(output.statistics.count(ConsensusOutcome::Unset), 0);
}
