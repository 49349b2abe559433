//! FASTA-backed reference bases, loaded fully into memory.
//!
//! [`ReferenceGenome`] reads every contig at construction so that per-column lookups made
//! while calling consensus are plain slice indexing. When a `.fai` index sits next to the
//! FASTA, sequences are read as raw byte ranges; otherwise the file is parsed sequentially
//! with `noodles::fasta`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Context, Result};
use log::debug;
use noodles::fasta::fai;

use crate::errors::DupconError;
use crate::validation::validate_file_exists;
use dupcon_consensus::ReferenceBases;

/// Reads one sequence using FAI offsets, stripping line terminators in memory.
fn read_sequence_raw(file: &mut File, record: &fai::Record) -> Result<Vec<u8>> {
    let line_bases = record.line_bases() as usize;
    let line_width = record.line_width() as usize;
    let seq_len = record.length() as usize;

    file.seek(SeekFrom::Start(record.offset()))?;

    if seq_len <= line_bases {
        let mut sequence = vec![0u8; seq_len];
        file.read_exact(&mut sequence)?;
        return Ok(sequence);
    }

    let complete_lines = seq_len / line_bases;
    let remaining = seq_len % line_bases;
    let total_bytes = if remaining > 0 {
        complete_lines * line_width + remaining
    } else {
        (complete_lines - 1) * line_width + line_bases
    };

    let mut raw = vec![0u8; total_bytes];
    file.read_exact(&mut raw)?;

    let mut sequence = Vec::with_capacity(seq_len);
    for line in raw.chunks(line_width) {
        let take = line.len().min(line_bases).min(seq_len - sequence.len());
        sequence.extend_from_slice(&line[..take]);
    }
    Ok(sequence)
}

/// Finds the FAI index for a FASTA file, trying `ref.fa.fai` style names.
fn find_fai_path(fasta_path: &Path) -> Option<PathBuf> {
    let appended = PathBuf::from(format!("{}.fai", fasta_path.display()));
    if appended.exists() {
        return Some(appended);
    }
    let replaced = fasta_path.with_extension("fa.fai");
    replaced.exists().then_some(replaced)
}

/// A reference genome held in memory and shareable between threads.
#[derive(Clone, Debug, Default)]
pub struct ReferenceGenome {
    sequences: Arc<AHashMap<String, Vec<u8>>>,
}

impl ReferenceGenome {
    /// Loads every sequence in the FASTA at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be parsed as FASTA.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dupcon_lib::reference::ReferenceGenome;
    ///
    /// let reference = ReferenceGenome::from_path("reference.fasta")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        validate_file_exists(path, "Reference FASTA")?;

        debug!("Reading reference FASTA into memory: {}", path.display());
        match find_fai_path(path) {
            Some(fai_path) => {
                debug!("Using FAI index: {}", fai_path.display());
                Self::from_indexed(path, &fai_path)
            }
            None => Self::from_sequential(path),
        }
    }

    fn from_indexed(fasta_path: &Path, fai_path: &Path) -> Result<Self> {
        let index = fai::fs::read(fai_path)
            .with_context(|| format!("Failed to read FAI index: {}", fai_path.display()))?;
        let records: &[fai::Record] = index.as_ref();
        let mut file = File::open(fasta_path)
            .with_context(|| format!("Failed to open FASTA: {}", fasta_path.display()))?;

        let mut sequences = AHashMap::with_capacity(records.len());
        for record in records {
            let name = String::from_utf8_lossy(record.name().as_ref()).into_owned();
            let sequence = read_sequence_raw(&mut file, record)
                .with_context(|| format!("Failed to read sequence {name}"))?;
            sequences.insert(name, sequence);
        }

        debug!("Loaded {} contigs (FAI-indexed)", sequences.len());
        Ok(Self { sequences: Arc::new(sequences) })
    }

    fn from_sequential(path: &Path) -> Result<Self> {
        use noodles::fasta;

        let mut reader = fasta::io::reader::Builder
            .build_from_path(path)
            .with_context(|| format!("Failed to open FASTA: {}", path.display()))?;

        let mut sequences = AHashMap::new();
        for result in reader.records() {
            let record = result.with_context(|| format!("Failed to parse FASTA: {}", path.display()))?;
            let name = std::str::from_utf8(record.name())?.to_string();
            let sequence: &[u8] = record.sequence().as_ref();
            sequences.insert(name, sequence.to_vec());
        }

        debug!("Loaded {} contigs (sequential)", sequences.len());
        Ok(Self { sequences: Arc::new(sequences) })
    }

    /// Builds a reference from named sequences.
    #[must_use]
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: Into<String>,
    {
        let sequences = sequences.into_iter().map(|(name, seq)| (name.into(), seq)).collect();
        Self { sequences: Arc::new(sequences) }
    }

    /// Number of contigs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Returns bases `start..=end` (1-based, inclusive), preserving case.
    ///
    /// # Errors
    ///
    /// Returns an error if the contig is unknown or the region exceeds its length.
    pub fn fetch(&self, chrom: &str, start: usize, end: usize) -> Result<&[u8]> {
        let sequence = self
            .sequences
            .get(chrom)
            .ok_or_else(|| DupconError::ReferenceNotFound { ref_name: chrom.to_string() })?;

        if start == 0 || start > end || end > sequence.len() {
            return Err(DupconError::InvalidParameter {
                parameter: "region".to_string(),
                reason: format!(
                    "Requested region {chrom}:{start}-{end} exceeds sequence length {}",
                    sequence.len()
                ),
            }
            .into());
        }
        Ok(&sequence[start - 1..end])
    }
}

impl ReferenceBases for ReferenceGenome {
    fn chromosome_length(&self, chromosome: &str) -> Option<usize> {
        self.sequences.get(chromosome).map(Vec::len)
    }

    fn base_at(&self, chromosome: &str, position: usize) -> Option<u8> {
        let index = position.checked_sub(1)?;
        self.sequences.get(chromosome)?.get(index).copied()
    }
}
