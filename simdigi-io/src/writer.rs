//! File writers for digitized events.

use crate::header::FileHeader;
use crate::Result;
use simdigi_core::Record;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writer for JSON-lines event files.
///
/// The header is written on creation; records follow one per line.
pub struct EventFileWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    records: usize,
}

impl EventFileWriter {
    /// Creates the file and writes its header.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn create<P: AsRef<Path>>(path: P, header: &FileHeader) -> Result<Self> {
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, header)?;
        writer.write_all(b"\n")?;
        Ok(Self {
            writer,
            path: path.as_ref().to_path_buf(),
            records: 0,
        })
    }

    /// Appends one record.
    ///
    /// # Errors
    /// Returns an error if the record cannot be encoded or written.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Returns the output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered output and closes the file.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.records)
    }
}
