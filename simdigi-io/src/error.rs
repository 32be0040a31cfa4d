//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of an event file is not valid JSON for its position.
    #[error("line {line}: {source}")]
    Json {
        /// 1-based line number.
        line: usize,
        /// Parser error.
        source: serde_json::Error,
    },

    /// A header or record could not be encoded.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// The file holds a different event collection than requested.
    #[error("{}: tree '{expected}' not found (file holds '{found}')", .path.display())]
    TreeNotFound {
        /// File that was opened.
        path: PathBuf,
        /// Requested tree name.
        expected: String,
        /// Tree name in the file header.
        found: String,
    },

    /// The input is already a digitizer output.
    #[error("{}: already digitized", .0.display())]
    AlreadyDigitized(PathBuf),

    /// Two inputs of one run map to the same output file.
    #[error("{}: output {} taken by {}", .input.display(), .output.display(), .first.display())]
    DuplicateOutput {
        /// Input that was skipped.
        input: PathBuf,
        /// Contested output file.
        output: PathBuf,
        /// Earlier input that owns the output.
        first: PathBuf,
    },

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] simdigi_core::Error),
}
