//! Consensus calling against a FASTA reference loaded from disk.

use std::io::Write;
use std::sync::Arc;

use noodles::sam::alignment::RecordBuf;
use tempfile::NamedTempFile;

use crate::helpers::{create_family, create_header, create_record, init_logging, int_tag};
use dupcon_lib::pipeline::{ConsensusPipeline, PipelineOptions, PipelineOutput};
use dupcon_lib::reference::ReferenceGenome;
use dupcon_lib::sam::{MUTATION_COUNT_TAG, consensus_to_record, fragments_from_records};
use dupcon_lib::{ConsensusOutcome, Fragment, GroupIdAllocator};

/// `chr1` holds `ACGTC` at 100..=104 with `A` elsewhere; `chr2` is short.
fn write_reference() -> NamedTempFile {
    let mut chr1 = "A".repeat(99);
    chr1.push_str("ACGTC");
    chr1.push_str(&"A".repeat(21));

    let mut file = tempfile::Builder::new().suffix(".fa").tempfile().expect("temp file");
    writeln!(file, ">chr1 test").expect("write");
    for line in chr1.as_bytes().chunks(60) {
        file.write_all(line).expect("write");
        writeln!(file).expect("write");
    }
    writeln!(file, ">chr2").expect("write");
    writeln!(file, "GGGG").expect("write");
    file.flush().expect("flush");
    file
}

fn run(reference: ReferenceGenome, records: &[RecordBuf]) -> (PipelineOutput, Vec<RecordBuf>) {
    init_logging();
    let header = create_header();
    let fragments: Vec<Fragment> =
        fragments_from_records(records, &header, "RX", "_R").expect("valid records");
    let pipeline = ConsensusPipeline::new(
        Arc::new(reference),
        PipelineOptions::default(),
        Arc::new(GroupIdAllocator::new()),
    )
    .expect("valid options");
    let output = pipeline.cluster_and_build(&fragments);
    let out = output
        .consensus
        .iter()
        .map(|g| consensus_to_record(&g.read, &header).expect("convertible read"))
        .collect();
    (output, out)
}

#[test]
fn test_reference_loads_from_fasta() {
    let fasta = write_reference();
    let reference = ReferenceGenome::from_path(fasta.path()).expect("reference loads");

    assert_eq!(reference.len(), 2);
    assert_eq!(reference.fetch("chr1", 100, 104).expect("in range"), b"ACGTC");
    assert_eq!(reference.fetch("chr2", 1, 4).expect("in range"), b"GGGG");
}

#[test]
fn test_tied_column_resolved_by_reference() {
    let fasta = write_reference();
    let reference = ReferenceGenome::from_path(fasta.path()).expect("reference loads");
    let records = vec![
        create_record("x:TTTT", "TTTT", 100, "5M", "ACGTA", &[30; 5]),
        create_record("y:TTTT", "TTTT", 100, "5M", "ACGTC", &[30; 5]),
    ];
    let (output, out) = run(reference, &records);

    assert_eq!(output.consensus[0].outcome, ConsensusOutcome::AlignmentOnly);
    assert_eq!(out[0].sequence().as_ref(), b"ACGTC");
    let quals: &[u8] = out[0].quality_scores().as_ref();
    assert_eq!(quals[4], 0);
    assert_eq!(int_tag(&out[0], MUTATION_COUNT_TAG), 0);
}

#[test]
fn test_mutations_counted_against_reference() {
    let fasta = write_reference();
    let reference = ReferenceGenome::from_path(fasta.path()).expect("reference loads");
    let records = create_family("GATTACA", 3, "m", "ACTTG", 30);
    let (output, out) = run(reference, &records);

    assert_eq!(output.consensus.len(), 1);
    assert_eq!(out[0].sequence().as_ref(), b"ACTTG");
    // ACGTC vs ACTTG differs at columns 3 and 5
    assert_eq!(int_tag(&out[0], MUTATION_COUNT_TAG), 2);
}

#[test]
fn test_soft_clip_overrun_is_unknown_reference() {
    let fasta = write_reference();
    let reference = ReferenceGenome::from_path(fasta.path()).expect("reference loads");
    let records = vec![
        create_record("a:CCCC", "CCCC", 1, "2S3M", "GGAAA", &[30; 5]),
        create_record("b:CCCC", "CCCC", 1, "2S3M", "TTAAA", &[30; 5]),
    ];
    let (output, out) = run(reference, &records);

    assert_eq!(output.consensus[0].outcome, ConsensusOutcome::AlignmentOnly);
    let quals: &[u8] = out[0].quality_scores().as_ref();
    assert_eq!(&quals[..2], &[0, 0]);
    assert_eq!(&quals[2..], &[30, 30, 30]);
    assert_eq!(int_tag(&out[0], MUTATION_COUNT_TAG), 0);
}
