//! Group identifiers across pipeline runs and threads.

use std::collections::HashSet;
use std::sync::Arc;

use noodles::sam::alignment::RecordBuf;

use crate::helpers::{assert_mi_tag, create_family, create_header};
use dupcon_lib::pipeline::{ConsensusPipeline, PipelineOptions};
use dupcon_lib::sam::{consensus_to_record, fragments_from_records};
use dupcon_lib::{Fragment, GroupIdAllocator, NoReference};

fn fragments(records: &[RecordBuf]) -> Vec<Fragment> {
    let header = create_header();
    fragments_from_records(records, &header, "RX", "_R").expect("valid records")
}

fn pipeline(ids: &Arc<GroupIdAllocator>, threads: usize) -> ConsensusPipeline {
    let options = PipelineOptions { threads, ..PipelineOptions::default() };
    ConsensusPipeline::new(Arc::new(NoReference), options, Arc::clone(ids)).expect("valid options")
}

#[test]
fn test_shared_allocator_continues_numbering() {
    let ids = Arc::new(GroupIdAllocator::new());
    let first = fragments(&create_family("AAAAAAAA", 2, "run1", "ACGTACGT", 30));
    let second = fragments(&create_family("CCCCCCCC", 2, "run2", "ACGTACGT", 30));

    let out1 = pipeline(&ids, 1).cluster_and_build(&first);
    let out2 = pipeline(&ids, 2).cluster_and_build(&second);

    assert_eq!(out1.consensus[0].read.group_id, "000001");
    assert_eq!(out2.consensus[0].read.group_id, "000002");
    assert_eq!(ids.next(), "000003");
}

#[test]
fn test_ids_wrap_after_largest() {
    let ids = Arc::new(GroupIdAllocator::starting_after(999_998));
    let mut records = create_family("AAAAAAAA", 3, "w", "ACGTACGT", 30);
    records.extend(create_family("GGGGGGGG", 2, "w", "ACGTACGT", 30));
    let header = create_header();

    let output = pipeline(&ids, 1).cluster_and_build(&fragments(&records));
    let out: Vec<RecordBuf> = output
        .consensus
        .iter()
        .map(|g| consensus_to_record(&g.read, &header).expect("convertible read"))
        .collect();

    assert_eq!(out.len(), 2);
    assert_mi_tag(&out[0], "999999");
    assert_mi_tag(&out[1], "000001");
    assert_eq!(out[1].name().map(ToString::to_string).as_deref(), Some("w:0:CNS_000001"));
}

#[test]
fn test_ids_unique_under_many_threads() {
    let ids = Arc::new(GroupIdAllocator::new());
    let barcodes = ["AAAAAAAA", "CCCCCCCC", "GGGGGGGG", "TTTTTTTT", "ACACACAC", "GTGTGTGT"];
    let records: Vec<RecordBuf> = barcodes
        .iter()
        .flat_map(|b| create_family(b, 2, "m", "ACGTACGT", 30))
        .collect();

    let output = pipeline(&ids, 4).cluster_and_build(&fragments(&records));
    let seen: HashSet<&str> = output.consensus.iter().map(|g| g.read.group_id.as_str()).collect();

    assert_eq!(output.consensus.len(), barcodes.len());
    assert_eq!(seen.len(), barcodes.len());
    let in_order: Vec<&str> = output.consensus.iter().map(|g| g.read.group_id.as_str()).collect();
    assert_eq!(in_order, vec!["000001", "000002", "000003", "000004", "000005", "000006"]);
}
