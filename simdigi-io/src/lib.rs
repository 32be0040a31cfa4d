//! simdigi-io: Event file I/O and per-file digitization for simdigi.
//!
//! Event files are JSON lines: a [`FileHeader`] followed by one record per
//! event. Files are read through memory maps via memmap2 and written
//! through buffered writers.
//!

mod error;
mod header;
mod pipeline;
mod reader;
pub mod scanner;
mod writer;

pub use error::{Error, Result};
pub use header::FileHeader;
pub use pipeline::{digitize_file, digitize_files, inspect_file, FileInfo, FileSummary};
pub use reader::{EventFileReader, MappedFileReader};
pub use scanner::{digitized_path, plan_jobs, traverse_event_files, DigitizeJob, DIGITIZED_SUFFIX};
pub use writer::EventFileWriter;
