//! Streaming reader for a reference log written by [`ReferenceSink`](super::ReferenceSink).

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use super::REFERENCE_HEADER;
use super::row::parse_row;
use crate::Reference;
use crate::error::ScrapeError;

/// One line of the log after the header.
#[derive(Debug, PartialEq, Eq)]
pub enum LogRow {
    Reference(Reference),
    /// Line that could not be parsed; 1-based line number.
    Malformed { line: usize, reason: String },
}

pub struct ReferenceLog {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl ReferenceLog {
    /// Open `path` for reading. An unreadable log is a configuration error.
    pub fn open(path: &Path) -> Result<Self, ScrapeError> {
        let file = File::open(path).map_err(|e| {
            ScrapeError::Configuration(format!(
                "cannot read reference log {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Read the whole log, keeping well-formed rows only.
    pub fn read_all(path: &Path) -> Result<Vec<Reference>, ScrapeError> {
        let mut out = Vec::new();
        for row in Self::open(path)? {
            if let LogRow::Reference(r) = row? {
                out.push(r);
            }
        }
        Ok(out)
    }
}

/// Parse one `<url>, "<title>"` row. The URL may also be quoted.
pub fn parse_reference_row(line: &str) -> Result<Reference, String> {
    let mut fields = parse_row(line)?.into_iter();
    let url = fields.next().unwrap_or_default();
    if url.is_empty() {
        return Err("empty url".to_string());
    }
    let title = fields.next().unwrap_or_default();
    Ok(Reference::new(url, title))
}

impl Iterator for ReferenceLog {
    type Item = Result<LogRow, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => return Some(Err(ScrapeError::io(&self.path, e))),
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || (self.line_no == 1 && trimmed == REFERENCE_HEADER) {
                continue;
            }
            return Some(Ok(match parse_reference_row(trimmed) {
                Ok(r) => LogRow::Reference(r),
                Err(reason) => LogRow::Malformed {
                    line: self.line_no,
                    reason,
                },
            }));
        }
    }
}
