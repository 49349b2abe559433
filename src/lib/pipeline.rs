//! Parallel consensus calling over independent duplicate groups.
//!
//! Groups share nothing, so they are processed on a rayon pool. Each worker owns a
//! [`ConsensusAssembler`] and its [`ConsensusStatistics`]; per-worker statistics are merged
//! once all groups are done. Group ids are drawn from a shared [`GroupIdAllocator`] in
//! input order before any work starts, so ids do not depend on scheduling.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

use dupcon_consensus::{
    ConsensusAssembler, ConsensusOptions, ConsensusRead, Fragment, GroupIdAllocator,
    ReferenceBases,
};
use dupcon_metrics::writer::{write_metrics, write_metrics_auto};
use dupcon_metrics::{ConsensusOutcome, ConsensusStatistics};
use dupcon_umi::{BarcodeClusterer, ClusterOptions, DuplicateGroup};

use crate::logging::{OperationTimer, log_consensus_summary};
use crate::validation::validate_pipeline_options;

/// Options for [`ConsensusPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Worker threads in the rayon pool
    pub threads: usize,
    pub cluster: ClusterOptions,
    pub consensus: ConsensusOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { threads: 1, cluster: ClusterOptions::default(), consensus: ConsensusOptions::default() }
    }
}

/// The consensus read built for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConsensus {
    pub read: ConsensusRead,
    pub outcome: ConsensusOutcome,
}

/// Consensus reads in input group order, plus merged statistics.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub consensus: Vec<GroupConsensus>,
    pub statistics: ConsensusStatistics,
}

impl PipelineOutput {
    /// Writes the statistics as key/value/description rows to a TSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_metrics<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_metrics(path, &self.statistics.metrics().to_kv_metrics(), "consensus")
    }

    /// Writes the statistics as a single wide row, one column per counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_summary_metrics<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_metrics_auto(path, &[self.statistics.metrics()])
    }
}

type WorkerState = (Vec<GroupConsensus>, ConsensusStatistics);

/// Clusters fragments and builds consensus reads on a thread pool.
pub struct ConsensusPipeline {
    reference: Arc<dyn ReferenceBases>,
    options: PipelineOptions,
    ids: Arc<GroupIdAllocator>,
    pool: rayon::ThreadPool,
}

impl ConsensusPipeline {
    /// Creates a pipeline after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the thread pool cannot be built.
    pub fn new(
        reference: Arc<dyn ReferenceBases>,
        options: PipelineOptions,
        ids: Arc<GroupIdAllocator>,
    ) -> Result<Self> {
        validate_pipeline_options(&options)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .context("Failed to build rayon thread pool")?;
        Ok(Self { reference, options, ids, pool })
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Builds one consensus read per group.
    ///
    /// Output order follows input order; empty groups produce nothing.
    #[must_use]
    pub fn process_groups(&self, groups: &[Vec<&Fragment>]) -> PipelineOutput {
        let ids: Vec<String> = groups.iter().map(|_| self.ids.next()).collect();
        let timer = OperationTimer::new("Calling consensus");

        let (consensus, statistics) = self.pool.install(|| {
            groups
                .par_iter()
                .zip(ids.par_iter())
                .fold(
                    || {
                        let assembler = ConsensusAssembler::new(
                            Arc::clone(&self.reference),
                            self.options.consensus.clone(),
                        );
                        (Vec::new(), assembler)
                    },
                    |(mut out, mut assembler), (group, id)| {
                        if let Some((read, outcome)) = assembler.build(group, id) {
                            out.push(GroupConsensus { read, outcome });
                        }
                        (out, assembler)
                    },
                )
                .map(|(out, mut assembler)| (out, assembler.take_statistics()))
                .reduce(WorkerState::default, |(mut left, mut left_stats), (right, right_stats)| {
                    left.extend(right);
                    left_stats.merge(&right_stats);
                    (left, left_stats)
                })
        });

        timer.log_completion(groups.len() as u64);
        log_consensus_summary(&statistics);
        PipelineOutput { consensus, statistics }
    }

    /// Clusters `fragments` by barcode and builds a consensus read for every group.
    #[must_use]
    pub fn cluster_and_build(&self, fragments: &[Fragment]) -> PipelineOutput {
        let clusterer = BarcodeClusterer::new(self.options.cluster.clone());
        let groups: Vec<Vec<&Fragment>> =
            clusterer.cluster(fragments).into_iter().map(DuplicateGroup::into_members).collect();
        debug!("Clustered {} fragments into {} duplicate groups", fragments.len(), groups.len());
        self.process_groups(&groups)
    }
}
