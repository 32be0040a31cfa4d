//! Event file discovery.
//!
//! Walks input directories for event files and maps each one to the path of
//! its digitized output.

use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of event files.
pub const EVENT_FILE_EXTENSION: &str = "jsonl";

/// Suffix of files written by the digitizer.
pub const DIGITIZED_SUFFIX: &str = ".digi.jsonl";

/// An input file and the output it will be digitized into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitizeJob {
    /// Raw event file.
    pub input: PathBuf,
    /// Digitized output file.
    pub output: PathBuf,
}

/// Returns every event file under `dir`, recursively, in sorted order.
///
/// Files whose name ends with `skip_suffix` are left out.
///
/// # Errors
/// Returns an error if a directory cannot be read.
pub fn traverse_event_files<P: AsRef<Path>>(dir: P, skip_suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.as_ref().to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_event_file(&path, skip_suffix) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_event_file(path: &Path, skip_suffix: &str) -> bool {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EVENT_FILE_EXTENSION));
    let skipped = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !skip_suffix.is_empty() && name.ends_with(skip_suffix));
    has_extension && !skipped
}

/// Output path for an input event file: `run.jsonl` becomes `run.digi.jsonl`.
///
/// The output lands next to the input unless `output_dir` is given.
#[must_use]
pub fn digitized_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "events".into(), |s| s.to_string_lossy());
    let name = format!("{stem}{DIGITIZED_SUFFIX}");
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Finds the event files under `dir` that still need digitizing.
///
/// With an `output_dir`, each output keeps its input's location relative to
/// `dir`, so `dir/a/run.jsonl` maps to `output_dir/a/run.digi.jsonl`.
///
/// # Errors
/// Returns an error if a directory cannot be read.
pub fn plan_jobs(dir: &Path, output_dir: Option<&Path>) -> Result<Vec<DigitizeJob>> {
    Ok(traverse_event_files(dir, DIGITIZED_SUFFIX)?
        .into_iter()
        .map(|input| {
            let target = output_dir.map(|out| {
                let relative = input
                    .strip_prefix(dir)
                    .ok()
                    .and_then(Path::parent)
                    .unwrap_or_else(|| Path::new(""));
                out.join(relative)
            });
            DigitizeJob {
                output: digitized_path(&input, target.as_deref()),
                input,
            }
        })
        .collect())
}
