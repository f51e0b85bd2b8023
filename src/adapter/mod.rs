//! Source adapters: the site-specific `Discover` / `Extract` capabilities.
//!
//! Each press has one independent implementation of [`SourceAdapter`]; the pipeline only
//! ever sees the trait. Parsing helpers are pure functions so they can be checked against
//! saved pages without network access.

pub mod chosun;
pub mod donga;
pub mod html;
pub mod http;
pub mod joongang;
pub mod paging;
pub mod text;

use std::sync::Arc;

use crate::error::ScrapeError;
use crate::{Press, Query, Record, Reference};

pub use chosun::ChosunAdapter;
pub use donga::DongaAdapter;
pub use http::{HttpClient, HttpConfig};
pub use joongang::JoongangAdapter;
pub use paging::{PageWindow, PagedReferences};
pub use text::{clean_text, extract_date};

/// Capability contract every press implements.
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Lazy, finite sequence of references for `query`. The stream may start past
    /// whole pages covered by `query.skip_count`; see [`ReferenceStream::pre_skipped`].
    fn discover(&self, query: &Query) -> Result<ReferenceStream<'_>, ScrapeError>;

    /// Fetch and parse the article at `url`.
    fn extract(&self, url: &str) -> Result<Record, ScrapeError>;
}

type RawIter<'a> = Box<dyn Iterator<Item = Result<Reference, ScrapeError>> + 'a>;

/// Raw discovery sequence handed out by an adapter.
pub struct ReferenceStream<'a> {
    pre_skipped: usize,
    iter: RawIter<'a>,
}

impl<'a> ReferenceStream<'a> {
    /// Stream whose first item is raw position `pre_skipped`.
    pub fn new<I>(pre_skipped: usize, iter: I) -> Self
    where
        I: Iterator<Item = Result<Reference, ScrapeError>> + 'a,
    {
        Self {
            pre_skipped,
            iter: Box::new(iter),
        }
    }

    /// Leading raw items the adapter never fetched because whole pages were skipped.
    pub fn pre_skipped(&self) -> usize {
        self.pre_skipped
    }
}

impl Iterator for ReferenceStream<'_> {
    type Item = Result<Reference, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// Build the adapter for `press`.
pub fn build_adapter(press: Press, config: &HttpConfig) -> Result<Arc<dyn SourceAdapter>, ScrapeError> {
    let http = HttpClient::new(config)?;
    let adapter: Arc<dyn SourceAdapter> = match press {
        Press::Joongang => Arc::new(JoongangAdapter::new(http)),
        Press::Donga => Arc::new(DongaAdapter::new(http)),
        Press::Chosun => Arc::new(ChosunAdapter::new(http)),
    };
    Ok(adapter)
}
