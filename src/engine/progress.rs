//! Progress counters for the collect and scrap stages.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Per-item callback handed to a stage. `None` when progress display is off.
pub type ProgressHook = Option<Box<dyn Fn(usize) + Send>>;

/// Create a counter. `total = 0` shows a plain count without percentage.
pub fn create_counter(desc: &'static str, total: usize, position: u16) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        position = position,
        unit = " articles"
    )))
}

/// Update progress bar if available.
/// Uses try_lock so a stage never blocks on the display.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Wrap a bar into a stage callback.
pub fn progress_callback(bar: &Option<ProgressBar>) -> ProgressHook {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Box::new(move |n: usize| update_progress_bar(&bar, n)) as Box<dyn Fn(usize) + Send>
    })
}

/// Advance a stage's hook by `n`, if any.
pub fn tick(hook: &ProgressHook, n: usize) {
    if let Some(f) = hook {
        f(n);
    }
}
