//! Extraction stage: one record per reference, failures skipped item by item.

use log::{error, info, warn};

use super::context::CancelToken;
use crate::adapter::SourceAdapter;
use crate::engine::progress::{ProgressHook, tick};
use crate::error::ScrapeError;
use crate::sink::RecordSink;
use crate::Reference;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Records written to the sink.
    pub scraped: usize,
    /// References skipped because extraction failed.
    pub failed: usize,
    /// Stopped by cancellation before the input ended.
    pub cancelled: bool,
}

/// Extract every reference in `references` and append the records to `sink`.
///
/// Per-item adapter failures (see [`ScrapeError::is_per_item`]) are logged with the URL and
/// skipped. Any other adapter error and sink I/O errors stop the stage. When `cancel` is given the loop stops between items once it is set; the pipelined
/// consumer passes `None` so queued references are always drained.
pub fn run_extraction<I>(
    adapter: &dyn SourceAdapter,
    references: I,
    sink: &mut RecordSink,
    cancel: Option<&CancelToken>,
    on_scraped: &ProgressHook,
) -> Result<ExtractionReport, ScrapeError>
where
    I: IntoIterator<Item = Reference>,
{
    info!("Scraping articles with {}", adapter.name());
    let mut report = ExtractionReport::default();
    for (i, reference) in references.into_iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            report.cancelled = true;
            info!("Scraping stopped by cancellation at [{}]", i + 1);
            break;
        }
        let n = i + 1;
        match adapter.extract(&reference.url) {
            Ok(record) => {
                sink.append(&record)?;
                report.scraped += 1;
                info!("Scraped [{}] {}", n, reference.url);
            }
            Err(e) if !e.is_per_item() => {
                error!("Scraping stopped at [{}] {}: {}", n, reference.url, e);
                return Err(e);
            }
            Err(e) => {
                report.failed += 1;
                warn!("Scraping failed [{}] {}: {}. Skipping it", n, reference.url, e);
            }
        }
        tick(on_scraped, 1);
    }
    if !report.cancelled {
        info!(
            "Scraping completed: {} scraped, {} failed",
            report.scraped, report.failed
        );
    }
    Ok(report)
}
