//! Error kinds shared by the adapters, the stages and the coordinator.
//!
//! Per-item failures ([`ScrapeError::Extraction`], [`ScrapeError::NotFound`]) stay inside the
//! extraction stage. [`ScrapeError::Discovery`] is transient and triggers the bounded resume
//! loop. Everything else terminates the run as `Failed`.

use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failure of a single HTTP request made by an adapter.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// True when the server says the resource is gone (404 / 410).
    pub fn is_gone(&self) -> bool {
        matches!(self, FetchError::Status { status: 404 | 410, .. })
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transient failure while walking search results.
    #[error("discovery failed: {message}")]
    Discovery {
        message: String,
        #[source]
        source: Option<FetchError>,
    },

    /// Failure fetching or parsing one article.
    #[error("extraction failed for {url}: {message}")]
    Extraction {
        url: String,
        message: String,
        #[source]
        source: Option<FetchError>,
    },

    /// The article no longer exists.
    #[error("{url} no longer exists")]
    NotFound { url: String },

    /// Bad input or unusable output path. Reported before any worker starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Discovery kept failing past the attempt ceiling.
    #[error(
        "discovery gave up after {attempts} attempts ({salvaged} references salvaged): {last}"
    )]
    RetriesExhausted {
        attempts: u32,
        salvaged: usize,
        ignored: usize,
        last: String,
    },

    /// Sink or reference-log I/O failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

impl ScrapeError {
    pub fn discovery(message: impl Into<String>) -> Self {
        ScrapeError::Discovery {
            message: message.into(),
            source: None,
        }
    }

    pub fn extraction(url: impl Into<String>, message: impl Into<String>) -> Self {
        ScrapeError::Extraction {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport error raised while discovering.
    pub fn from_discovery_fetch(err: FetchError) -> Self {
        ScrapeError::Discovery {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Wrap a transport error raised while extracting `url`. 404/410 become `NotFound`.
    pub fn from_extraction_fetch(url: &str, err: FetchError) -> Self {
        if err.is_gone() {
            return ScrapeError::NotFound {
                url: url.to_string(),
            };
        }
        ScrapeError::Extraction {
            url: url.to_string(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Contained within the extraction stage: log, skip, continue.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            ScrapeError::Extraction { .. } | ScrapeError::NotFound { .. }
        )
    }

    /// Eligible for the discovery resume loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::Discovery { .. })
    }
}
