//! Memory-mapped file readers.
//!

use crate::header::FileHeader;
use crate::{Error, Result};
use memmap2::Mmap;
use simdigi_core::Record;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to efficiently access file contents without
/// loading the entire file into memory.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Returns the path this reader was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns an iterator over lines with their 1-based line numbers.
    ///
    /// A trailing carriage return is stripped from each line.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.as_bytes()
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .enumerate()
            .map(|(i, line)| (i + 1, line))
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Reader for JSON-lines event files.
///
/// The first line is a [`FileHeader`]; every following non-blank line is
/// one event [`Record`]. Records are parsed lazily.
pub struct EventFileReader {
    reader: MappedFileReader,
    header: FileHeader,
}

impl EventFileReader {
    /// Opens an event file and parses its header.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped, is empty, or its first
    /// line is not a valid header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        if reader.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "{}: empty file",
                reader.path().display()
            )));
        }

        let (line, first) = reader
            .lines()
            .next()
            .ok_or_else(|| Error::InvalidFormat("missing header".to_string()))?;
        let header: FileHeader =
            serde_json::from_slice(first).map_err(|source| Error::Json { line, source })?;

        Ok(Self { reader, header })
    }

    /// Returns the file header.
    #[must_use]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Iterates over the event records in file order.
    ///
    /// Each item fails independently with the line number of the bad record.
    pub fn records(&self) -> impl Iterator<Item = Result<Record>> + '_ {
        self.reader
            .lines()
            .skip(1)
            .filter(|(_, line)| !is_blank(line))
            .map(|(line, bytes)| {
                serde_json::from_slice(bytes).map_err(|source| Error::Json { line, source })
            })
    }

    /// Reads all records, stopping at the first invalid one.
    ///
    /// # Errors
    /// Returns the first record parse error.
    pub fn read_all(&self) -> Result<Vec<Record>> {
        self.records().collect()
    }
}
