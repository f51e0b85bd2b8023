//! Run context: the cancellation signal and the per-stage progress hooks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::Opts;
use crate::engine::progress::{ProgressHook, create_counter, progress_callback};

/// Granularity of cancellable sleeps.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Shared cancellation flag. Set by the Ctrl+C handler or a library caller; read by the
/// producer between discovery calls and by the standalone extraction loop between items.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Sleep for `duration` unless cancelled first. Returns false when cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }
}

/// Progress hooks for the two stages. Both are `None` unless `--progress` is set.
pub struct StageProgress {
    pub on_collected: ProgressHook,
    pub on_scraped: ProgressHook,
}

impl StageProgress {
    fn none() -> Self {
        Self {
            on_collected: None,
            on_scraped: None,
        }
    }

    /// Bars for the stages a run uses. The collect bar's total is the target count.
    pub fn for_run(opts: &Opts, collect_total: Option<usize>, scrap: bool) -> Self {
        if !opts.progress {
            return Self::none();
        }
        let collected = collect_total.map(|total| create_counter("Collecting", total, 0));
        let scraped = scrap.then(|| create_counter("Scraping", 0, 1));
        Self {
            on_collected: progress_callback(&collected),
            on_scraped: progress_callback(&scraped),
        }
    }
}
