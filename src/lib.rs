//! Presscrape: press article collector and scraper.
//!
//! Discovery walks a press site's search results and emits article [`Reference`]s; extraction
//! turns each reference into a dated [`Record`]. The two stages run standalone
//! ([`RunMode::Collect`], [`RunMode::Scrap`]) or as a pipeline joined by a bounded queue
//! ([`RunMode::Pipeline`]).

pub mod adapter;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::{FetchError, ScrapeError};
pub use types::*;

use log::{debug, error};
use std::sync::Arc;

use adapter::{HttpConfig, SourceAdapter};
use pipeline::CancelToken;

/// Result alias used by the CLI layer
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: build the adapter for `opts.press` and run `mode`.
///
/// `query` is required for [`RunMode::Collect`] and [`RunMode::Pipeline`] and ignored for
/// [`RunMode::Scrap`], which reads `opts.list_path`. Failures are reported through the
/// returned summary's outcome; this never panics on bad input.
pub fn run(
    mode: RunMode,
    query: Option<&Query>,
    opts: &Opts,
    cancel: &CancelToken,
) -> RunSummary {
    debug!(
        "{} CONFIG:{:#?}",
        utils::PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );
    match adapter::build_adapter(opts.press, &HttpConfig::from(opts)) {
        Ok(adapter) => run_with_adapter(mode, query, opts, adapter, cancel),
        Err(e) => {
            error!("{}", e);
            RunSummary::failed(&e)
        }
    }
}

/// Same as [`run`] with a caller-supplied adapter.
pub fn run_with_adapter(
    mode: RunMode,
    query: Option<&Query>,
    opts: &Opts,
    adapter: Arc<dyn SourceAdapter>,
    cancel: &CancelToken,
) -> RunSummary {
    match (mode, query) {
        (RunMode::Scrap, _) => pipeline::run_scrap(adapter.as_ref(), opts, cancel),
        (RunMode::Collect, Some(q)) => pipeline::run_collect(adapter.as_ref(), q, opts, cancel),
        (RunMode::Pipeline, Some(q)) => pipeline::run_pipeline(adapter, q, opts, cancel),
        (_, None) => {
            let e = ScrapeError::Configuration("collecting needs a query".to_string());
            error!("{}", e);
            RunSummary::failed(&e)
        }
    }
}
