//! Discovery stage: walks the adapter's raw sequence, applies skip/limit accounting and
//! resumes after transient failures.
//!
//! A failed pass is restarted with `skip + emitted` / `target - emitted`, so the restart picks
//! up right after the last delivered reference. Passes are bounded by
//! [`RetryPolicy::max_attempts`].

use log::{debug, info, warn};

use super::context::CancelToken;
use super::retry::RetryPolicy;
use crate::adapter::SourceAdapter;
use crate::engine::progress::{ProgressHook, tick};
use crate::error::ScrapeError;
use crate::{Query, Reference};

/// What discovery did, owned by the producer until it finishes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// References delivered downstream.
    pub emitted: usize,
    /// Leading raw matches discarded (at most `skip_count`).
    pub ignored: usize,
    /// Passes made, including the first.
    pub attempts: u32,
    /// The source ran out before the target was reached.
    pub exhausted: bool,
    /// Stopped by cancellation.
    pub cancelled: bool,
    /// Stopped because the consumer went away.
    pub consumer_gone: bool,
}

/// How a single pass over the raw sequence ended.
enum PassEnd {
    TargetReached,
    SourceExhausted,
    Cancelled,
    ConsumerGone,
    SourceFailed(ScrapeError),
}

/// Run discovery for `query`, handing each reference to `emit`.
///
/// `emit` persists and forwards one reference; `Ok(false)` means downstream is closed and
/// discovery should stop. Errors from `emit` are fatal and returned as is.
pub fn run_discovery<E>(
    adapter: &dyn SourceAdapter,
    query: &Query,
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut emit: E,
    on_collected: &ProgressHook,
) -> Result<DiscoveryReport, ScrapeError>
where
    E: FnMut(Reference) -> Result<bool, ScrapeError>,
{
    info!(
        "Collecting {} references from {} (ignoring first {})",
        query.target_count,
        adapter.name(),
        query.skip_count
    );
    let mut report = DiscoveryReport::default();
    loop {
        if report.emitted >= query.target_count {
            break;
        }
        report.attempts += 1;
        let resumed = query.resume_after(report.emitted);
        match discovery_pass(adapter, query, &resumed, &mut report, cancel, &mut emit, on_collected)? {
            PassEnd::TargetReached => break,
            PassEnd::SourceExhausted => {
                report.exhausted = true;
                warn!(
                    "Not enough references to collect: {} of {}",
                    report.emitted, query.target_count
                );
                break;
            }
            PassEnd::Cancelled => {
                report.cancelled = true;
                info!("Collecting stopped by cancellation at [{}]", report.emitted);
                break;
            }
            PassEnd::ConsumerGone => {
                report.consumer_gone = true;
                warn!("Extraction stopped consuming; collecting halted");
                break;
            }
            PassEnd::SourceFailed(err) => {
                if !err.is_transient() {
                    return Err(err);
                }
                if !policy.allows_another(report.attempts) {
                    return Err(ScrapeError::RetriesExhausted {
                        attempts: report.attempts,
                        salvaged: report.emitted,
                        ignored: report.ignored,
                        last: err.to_string(),
                    });
                }
                let delay = policy.delay_for(report.attempts);
                warn!(
                    "Collecting failed at [{}]: {}. Resuming after {} collected in {:?} (attempt {}/{})",
                    query.skip_count.saturating_add(report.emitted + 1),
                    err,
                    report.emitted,
                    delay,
                    report.attempts + 1,
                    policy.max_attempts
                );
                if !cancel.sleep(delay) {
                    report.cancelled = true;
                    break;
                }
            }
        }
    }
    if report.emitted >= query.target_count && !report.cancelled {
        info!("Collecting completed: {} references", report.emitted);
    }
    Ok(report)
}

/// One pass over a fresh raw sequence for `resumed`. `requested` carries the user's skip count
/// so only genuinely ignored items are counted and logged as such.
fn discovery_pass<E>(
    adapter: &dyn SourceAdapter,
    requested: &Query,
    resumed: &Query,
    report: &mut DiscoveryReport,
    cancel: &CancelToken,
    emit: &mut E,
    on_collected: &ProgressHook,
) -> Result<PassEnd, ScrapeError>
where
    E: FnMut(Reference) -> Result<bool, ScrapeError>,
{
    if cancel.is_cancelled() {
        return Ok(PassEnd::Cancelled);
    }
    let mut stream = match adapter.discover(resumed) {
        Ok(s) => s,
        Err(e) => return Ok(PassEnd::SourceFailed(e)),
    };
    let mut position = stream.pre_skipped();
    report.ignored = report.ignored.max(position.min(requested.skip_count));
    let mut pass_emitted = 0_usize;
    loop {
        if cancel.is_cancelled() {
            return Ok(PassEnd::Cancelled);
        }
        let reference = match stream.next() {
            None => return Ok(PassEnd::SourceExhausted),
            Some(Err(e)) => return Ok(PassEnd::SourceFailed(e)),
            Some(Ok(r)) => r,
        };
        let raw_position = position;
        position += 1;
        if raw_position < resumed.skip_count {
            if raw_position < requested.skip_count {
                if raw_position >= report.ignored {
                    report.ignored = raw_position + 1;
                    info!(
                        "Ignored reference, {} left",
                        requested.skip_count - report.ignored
                    );
                }
            } else {
                debug!("Passing already collected {}", reference.url);
            }
            continue;
        }
        let url = reference.url.clone();
        if !emit(reference)? {
            return Ok(PassEnd::ConsumerGone);
        }
        report.emitted += 1;
        pass_emitted += 1;
        info!("Collected [{}] {}", requested.skip_count.saturating_add(report.emitted), url);
        tick(on_collected, 1);
        if pass_emitted >= resumed.target_count {
            return Ok(PassEnd::TargetReached);
        }
    }
}
