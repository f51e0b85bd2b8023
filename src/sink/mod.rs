//! Persistence sinks: append-only row files with a fixed header.
//!
//! One row is one line and is written with a single write followed by a flush, so a file
//! left behind by an interrupted run always holds the header and whole rows only.

pub mod merge;
pub mod reader;
pub mod row;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;
use crate::{Record, Reference};

pub use merge::merge_result_files;
pub use reader::{LogRow, ReferenceLog};
pub use row::{format_record_row, format_reference_row, parse_row};

/// Header of the reference log.
pub const REFERENCE_HEADER: &str = r#""url", "title""#;
/// Header of the result file.
pub const RESULT_HEADER: &str = r#""date", "title", "body""#;

/// Line-oriented writer shared by both sinks.
struct RowWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl RowWriter {
    /// Create (truncate) `path` and write `header`. Failure here is a configuration error.
    fn create(path: &Path, header: &str) -> Result<Self, ScrapeError> {
        let file = File::create(path).map_err(|e| {
            ScrapeError::Configuration(format!("cannot create {}: {e}", path.display()))
        })?;
        let mut w = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        };
        w.write_line(header).map_err(|e| {
            ScrapeError::Configuration(format!("cannot write {}: {e}", path.display()))
        })?;
        Ok(w)
    }

    fn write_line(&mut self, line: &str) -> Result<(), ScrapeError> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.writer
            .write_all(buf.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| ScrapeError::io(&self.path, e))
    }

    fn append(&mut self, line: &str) -> Result<(), ScrapeError> {
        self.write_line(line)?;
        self.rows += 1;
        Ok(())
    }

    fn close(mut self) -> Result<usize, ScrapeError> {
        self.writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_all())
            .map_err(|e| ScrapeError::io(&self.path, e))?;
        log::debug!("Closed {} ({} rows)", self.path.display(), self.rows);
        Ok(self.rows)
    }
}

/// Reference log writer. Owned by the discovery stage.
pub struct ReferenceSink {
    inner: RowWriter,
}

impl ReferenceSink {
    pub fn create(path: &Path) -> Result<Self, ScrapeError> {
        Ok(Self {
            inner: RowWriter::create(path, REFERENCE_HEADER)?,
        })
    }

    pub fn append(&mut self, reference: &Reference) -> Result<(), ScrapeError> {
        self.inner.append(&format_reference_row(reference))
    }

    pub fn rows(&self) -> usize {
        self.inner.rows
    }

    /// Flush and release the file. Returns the number of rows written.
    pub fn close(self) -> Result<usize, ScrapeError> {
        self.inner.close()
    }
}

/// Result file writer. Owned by the extraction stage.
pub struct RecordSink {
    inner: RowWriter,
}

impl RecordSink {
    pub fn create(path: &Path) -> Result<Self, ScrapeError> {
        Ok(Self {
            inner: RowWriter::create(path, RESULT_HEADER)?,
        })
    }

    pub fn append(&mut self, record: &Record) -> Result<(), ScrapeError> {
        self.inner.append(&format_record_row(record))
    }

    pub fn rows(&self) -> usize {
        self.inner.rows
    }

    /// Flush and release the file. Returns the number of rows written.
    pub fn close(self) -> Result<usize, ScrapeError> {
        self.inner.close()
    }
}
