//! Per-file digitization.

use crate::header::FileHeader;
use crate::reader::EventFileReader;
use crate::scanner::DigitizeJob;
use crate::writer::EventFileWriter;
use crate::{Error, Result};
use rayon::prelude::*;
use simdigi_algorithms::{
    ChannelClassifier, DetectorType, DigitizationConfig, DigitizationStatistics, Digitizer,
};
use simdigi_core::ChannelId;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of digitizing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Input file.
    pub input: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Event and hit counters.
    pub stats: DigitizationStatistics,
}

/// Digitizes every event of `input` into `output`.
///
/// The schema is resolved once from the input header. On failure the
/// partially written output is removed.
///
/// # Errors
/// Returns [`Error::TreeNotFound`] if the file holds a different tree,
/// [`Error::AlreadyDigitized`] for digitizer outputs, and any read, schema
/// or write error.
pub fn digitize_file(
    input: &Path,
    output: &Path,
    tree: &str,
    config: &DigitizationConfig,
) -> Result<FileSummary> {
    let reader = EventFileReader::open(input)?;
    let header = reader.header();
    if header.digitized {
        return Err(Error::AlreadyDigitized(input.to_path_buf()));
    }
    if header.tree != tree {
        return Err(Error::TreeNotFound {
            path: input.to_path_buf(),
            expected: tree.to_string(),
            found: header.tree.clone(),
        });
    }

    let digitizer = Digitizer::from_config(config, &header.branches)?;
    let out_header = header.digitized(digitizer.schema().output_field_names());
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    let result = write_events(&reader, &digitizer, output, &out_header);
    if result.is_err() && output.exists() {
        if let Err(e) = fs::remove_file(output) {
            log::warn!("could not remove partial output {}: {e}", output.display());
        }
    }
    let stats = result?;

    log::info!(
        "{} -> {}: {} events, {} hits -> {} pulses ({} empty)",
        input.display(),
        output.display(),
        stats.events,
        stats.raw_hits,
        stats.pulses,
        stats.empty_events
    );

    Ok(FileSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        stats,
    })
}

fn write_events(
    reader: &EventFileReader,
    digitizer: &Digitizer,
    output: &Path,
    header: &FileHeader,
) -> Result<DigitizationStatistics> {
    let mut writer = EventFileWriter::create(output, header)?;
    let mut stats = DigitizationStatistics::default();
    for record in reader.records() {
        let digitized = digitizer.process(&record?)?;
        stats.record(digitized.raw_hits, digitized.pulses);
        writer.write_record(&digitized.record)?;
    }
    writer.finish()?;
    Ok(stats)
}

/// Digitizes a list of files, one result per job in job order.
///
/// Jobs run on the rayon thread pool when `parallel` is set. A failing job
/// does not stop the others. A job whose output was already claimed by an
/// earlier job is not run and fails with [`Error::DuplicateOutput`].
pub fn digitize_files(
    jobs: &[DigitizeJob],
    tree: &str,
    config: &DigitizationConfig,
    parallel: bool,
) -> Vec<Result<FileSummary>> {
    let owners = output_owners(jobs);
    let run = |(index, job): (usize, &DigitizeJob)| {
        let first = owners[index];
        if first != index {
            return Err(Error::DuplicateOutput {
                input: job.input.clone(),
                output: job.output.clone(),
                first: jobs[first].input.clone(),
            });
        }
        digitize_file(&job.input, &job.output, tree, config)
    };
    if parallel {
        jobs.par_iter().enumerate().map(run).collect()
    } else {
        jobs.iter().enumerate().map(run).collect()
    }
}

/// Index of the first job writing each job's output.
fn output_owners(jobs: &[DigitizeJob]) -> Vec<usize> {
    let mut first_by_output: HashMap<&Path, usize> = HashMap::new();
    jobs.iter()
        .enumerate()
        .map(|(index, job)| *first_by_output.entry(job.output.as_path()).or_insert(index))
        .collect()
}

/// Summary of an event file's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// File header.
    pub header: FileHeader,
    /// File size in bytes.
    pub file_size: usize,
    /// Number of records.
    pub records: usize,
    /// Hits over all records.
    pub total_hits: usize,
    /// Distinct scintillator channels.
    pub scintillator_channels: usize,
    /// Distinct RPC channels.
    pub rpc_channels: usize,
}

/// Reads every record of `path` and counts events, hits and channels.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn inspect_file(path: &Path, config: &DigitizationConfig) -> Result<FileInfo> {
    let reader = EventFileReader::open(path)?;
    let header = reader.header();
    let schema = config.schema().resolve(&header.branches)?;
    let classifier = config.classifier();

    let mut records = 0;
    let mut total_hits = 0;
    let mut channels: BTreeSet<ChannelId> = BTreeSet::new();
    for record in reader.records() {
        let event = schema.decode(&record?)?;
        records += 1;
        total_hits += event.n_hits();
        channels.extend(event.hits.iter().map(|hit| hit.detector));
    }

    let rpc_channels = channels
        .iter()
        .filter(|&&channel| classifier.classify(channel) == DetectorType::Rpc)
        .count();

    Ok(FileInfo {
        header: header.clone(),
        file_size: reader.file_size(),
        records,
        total_hits,
        scintillator_channels: channels.len() - rpc_channels,
        rpc_channels,
    })
}
