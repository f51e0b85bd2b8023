//! Pipeline coordinator: owns both stages, the bounded queue and the sinks, and turns
//! whatever happened into exactly one [`RunOutcome`].
//!
//! Collect + scrap: discovery thread → queue → extraction thread. Cancellation stops the
//! producer between discovery calls; the producer then drops its end of the queue, so the
//! consumer drains what was already queued and stops. Both sinks are closed before the
//! summary is returned.

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread;

use super::context::{CancelToken, StageProgress};
use super::discovery::{DiscoveryReport, run_discovery};
use super::extraction::{ExtractionReport, run_extraction};
use super::queue::bounded_queue;
use super::retry::RetryPolicy;
use crate::adapter::SourceAdapter;
use crate::error::ScrapeError;
use crate::sink::{LogRow, RecordSink, ReferenceLog, ReferenceSink};
use crate::{Opts, Query, RunOutcome, RunSummary};

/// Coordinator lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PipelineState {
    Idle,
    Running,
    Draining,
    Terminated,
}

impl PipelineState {
    fn can_become(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Running) | (Running, Draining) | (Draining, Terminated)
        )
    }
}

/// Tracks the lifecycle state; transitions are logged at debug level.
#[derive(Debug)]
struct Coordinator {
    state: PipelineState,
}

impl Coordinator {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
        }
    }

    fn advance(&mut self, next: PipelineState, why: &str) {
        debug_assert!(
            self.state.can_become(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Pipeline {:?} -> {:?} ({})", self.state, next, why);
        self.state = next;
    }
}

/// Map a finished run onto its summary line and log it.
fn finish(result: Result<RunSummary, ScrapeError>, what: &str) -> RunSummary {
    let summary = result.unwrap_or_else(|e| RunSummary::failed(&e));
    match summary.outcome {
        RunOutcome::Completed => info!(
            "{} Completed: {} collected, {} ignored, {} scraped, {} failed",
            what, summary.collected, summary.ignored, summary.scraped, summary.failed_items
        ),
        RunOutcome::Aborted => warn!(
            "{} Aborted by cancellation: {} collected, {} scraped",
            what, summary.collected, summary.scraped
        ),
        RunOutcome::Failed => error!(
            "{} Failed: {}",
            what,
            summary.error.as_deref().unwrap_or("unknown error")
        ),
    }
    summary
}

/// Outcome from what the stages reported. Errors win over cancellation.
fn outcome_of(error: &Option<ScrapeError>, cancel: &CancelToken) -> RunOutcome {
    if error.is_some() {
        RunOutcome::Failed
    } else if cancel.is_cancelled() {
        RunOutcome::Aborted
    } else {
        RunOutcome::Completed
    }
}

/// Keep the first error seen.
fn note_error(slot: &mut Option<ScrapeError>, result: Result<usize, ScrapeError>) {
    if let Err(e) = result
        && slot.is_none()
    {
        *slot = Some(e);
    }
}

/// Discovery only: write the reference log.
pub fn run_collect(
    adapter: &dyn SourceAdapter,
    query: &Query,
    opts: &Opts,
    cancel: &CancelToken,
) -> RunSummary {
    finish(collect_inner(adapter, query, opts, cancel), "Collecting")
}

fn collect_inner(
    adapter: &dyn SourceAdapter,
    query: &Query,
    opts: &Opts,
    cancel: &CancelToken,
) -> Result<RunSummary, ScrapeError> {
    query.validate()?;
    let mut coordinator = Coordinator::new();
    let mut list_sink = ReferenceSink::create(&opts.list_path)?;
    let policy = RetryPolicy::from_opts(opts);
    let progress = StageProgress::for_run(opts, Some(query.target_count), false);

    coordinator.advance(PipelineState::Running, "collect started");
    let result = run_discovery(
        adapter,
        query,
        &policy,
        cancel,
        |r| list_sink.append(&r).map(|_| true),
        &progress.on_collected,
    );
    coordinator.advance(PipelineState::Draining, "discovery finished");

    let mut first_error = None;
    let report = discovery_result(result, &mut first_error);
    note_error(&mut first_error, list_sink.close());
    coordinator.advance(PipelineState::Terminated, "reference log closed");

    let mut summary = RunSummary::new(outcome_of(&first_error, cancel));
    summary.collected = report.emitted;
    summary.ignored = report.ignored;
    summary.discovery_attempts = report.attempts;
    summary.error = first_error.map(|e| e.to_string());
    Ok(summary)
}

/// Split a discovery result into its report, recording a failure in `slot`.
/// On exhausted retries the salvaged and ignored counts still show up in the report.
fn discovery_result(
    result: Result<DiscoveryReport, ScrapeError>,
    slot: &mut Option<ScrapeError>,
) -> DiscoveryReport {
    match result {
        Ok(report) => report,
        Err(e) => {
            let mut report = DiscoveryReport::default();
            if let ScrapeError::RetriesExhausted {
                attempts,
                salvaged,
                ignored,
                ..
            } = &e
            {
                report.emitted = *salvaged;
                report.ignored = *ignored;
                report.attempts = *attempts;
            }
            slot.get_or_insert(e);
            report
        }
    }
}

/// Extraction only: read references from the log at `opts.list_path`.
pub fn run_scrap(adapter: &dyn SourceAdapter, opts: &Opts, cancel: &CancelToken) -> RunSummary {
    finish(scrap_inner(adapter, opts, cancel), "Scraping")
}

fn scrap_inner(
    adapter: &dyn SourceAdapter,
    opts: &Opts,
    cancel: &CancelToken,
) -> Result<RunSummary, ScrapeError> {
    let mut coordinator = Coordinator::new();
    let log = ReferenceLog::open(&opts.list_path)?;
    let mut result_sink = RecordSink::create(&opts.result_path)?;
    let progress = StageProgress::for_run(opts, None, true);

    coordinator.advance(PipelineState::Running, "scrap started");
    let mut malformed = 0_usize;
    let mut read_error: Option<ScrapeError> = None;
    let references = log
        .map_while(|row| match row {
            Ok(LogRow::Reference(r)) => Some(Some(r)),
            Ok(LogRow::Malformed { line, reason }) => {
                warn!("Skipping malformed reference log line {}: {}", line, reason);
                malformed += 1;
                Some(None)
            }
            Err(e) => {
                read_error = Some(e);
                None
            }
        })
        .flatten();
    let result = run_extraction(
        adapter,
        references,
        &mut result_sink,
        Some(cancel),
        &progress.on_scraped,
    );
    coordinator.advance(PipelineState::Draining, "reference log consumed");

    let mut first_error = read_error;
    let report = extraction_result(result, result_sink.close(), &mut first_error);
    coordinator.advance(PipelineState::Terminated, "result file closed");

    let mut summary = RunSummary::new(outcome_of(&first_error, cancel));
    summary.scraped = report.scraped;
    summary.failed_items = report.failed + malformed;
    summary.error = first_error.map(|e| e.to_string());
    Ok(summary)
}

/// Same for extraction. The scraped count is taken from the rows the result sink holds, so
/// it stays right when the stage stopped on an error.
fn extraction_result(
    result: Result<ExtractionReport, ScrapeError>,
    closed: Result<usize, ScrapeError>,
    slot: &mut Option<ScrapeError>,
) -> ExtractionReport {
    let mut report = match result {
        Ok(report) => report,
        Err(e) => {
            slot.get_or_insert(e);
            ExtractionReport::default()
        }
    };
    match closed {
        Ok(rows) => report.scraped = rows,
        Err(e) => {
            slot.get_or_insert(e);
        }
    }
    report
}

/// What the producer thread hands back when it finishes.
struct ProducerResult {
    discovery: Result<DiscoveryReport, ScrapeError>,
    max_queue_depth: usize,
    closed: Result<usize, ScrapeError>,
}

/// What the consumer thread hands back when it finishes.
struct ConsumerResult {
    extraction: Result<ExtractionReport, ScrapeError>,
    closed: Result<usize, ScrapeError>,
}

/// Discovery feeding extraction through the bounded queue.
pub fn run_pipeline(
    adapter: Arc<dyn SourceAdapter>,
    query: &Query,
    opts: &Opts,
    cancel: &CancelToken,
) -> RunSummary {
    finish(pipeline_inner(adapter, query, opts, cancel), "Process")
}

fn pipeline_inner(
    adapter: Arc<dyn SourceAdapter>,
    query: &Query,
    opts: &Opts,
    cancel: &CancelToken,
) -> Result<RunSummary, ScrapeError> {
    query.validate()?;
    let mut coordinator = Coordinator::new();
    // Both sinks open before any worker starts, so an unwritable path fails the run up front.
    let mut list_sink = ReferenceSink::create(&opts.list_path)?;
    let mut result_sink = RecordSink::create(&opts.result_path)?;
    let (mut producer, consumer) = bounded_queue(opts.queue_capacity);
    let policy = RetryPolicy::from_opts(opts);
    let StageProgress {
        on_collected,
        on_scraped,
    } = StageProgress::for_run(opts, Some(query.target_count), true);

    coordinator.advance(PipelineState::Running, "workers starting");

    let consumer_handle = {
        let adapter = Arc::clone(&adapter);
        thread::spawn(move || {
            let extraction =
                run_extraction(adapter.as_ref(), consumer, &mut result_sink, None, &on_scraped);
            ConsumerResult {
                extraction,
                closed: result_sink.close(),
            }
        })
    };

    let producer_handle = {
        let adapter = Arc::clone(&adapter);
        let query = query.clone();
        let cancel = cancel.clone();
        thread::spawn(move || {
            let discovery = run_discovery(
                adapter.as_ref(),
                &query,
                &policy,
                &cancel,
                |r| {
                    list_sink.append(&r)?;
                    Ok(producer.push(r).is_ok())
                },
                &on_collected,
            );
            // Dropping the producer is the end-of-stream signal.
            let max_queue_depth = producer.close();
            ProducerResult {
                discovery,
                max_queue_depth,
                closed: list_sink.close(),
            }
        })
    };

    let produced = producer_handle.join();
    coordinator.advance(
        PipelineState::Draining,
        if cancel.is_cancelled() {
            "cancelled"
        } else {
            "discovery finished"
        },
    );
    let consumed = consumer_handle.join();
    coordinator.advance(PipelineState::Terminated, "queue drained, sinks closed");

    let mut first_error = None;
    let (discovery, max_queue_depth) = match produced {
        Ok(p) => {
            let report = discovery_result(p.discovery, &mut first_error);
            note_error(&mut first_error, p.closed);
            (report, p.max_queue_depth)
        }
        Err(_) => {
            first_error = Some(ScrapeError::WorkerPanicked("discovery"));
            (DiscoveryReport::default(), 0)
        }
    };
    let extraction = match consumed {
        Ok(c) => {
            extraction_result(c.extraction, c.closed, &mut first_error)
        }
        Err(_) => {
            first_error.get_or_insert(ScrapeError::WorkerPanicked("extraction"));
            ExtractionReport::default()
        }
    };

    let mut summary = RunSummary::new(outcome_of(&first_error, cancel));
    summary.collected = discovery.emitted;
    summary.ignored = discovery.ignored;
    summary.discovery_attempts = discovery.attempts;
    summary.max_queue_depth = max_queue_depth;
    summary.scraped = extraction.scraped;
    summary.failed_items = extraction.failed;
    summary.error = first_error.map(|e| e.to_string());
    Ok(summary)
}
