//! CLI command handler: build options from file + flags, install Ctrl+C, run the chosen mode.

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::path::Path;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::pipeline::CancelToken;
use crate::sink::merge_result_files;
use crate::utils::settings_toml::{apply_file_to_opts, load_settings_toml};
use crate::utils::{PackagePaths, default_list_filename, default_result_filename, setup_logging, today};
use crate::{Opts, Query, RunMode, RunOutcome, RunSummary};

/// Defaults, then `.presscrape.toml`, then environment, then flags.
fn setup_opts(cli: &Cli, dir: &Path) -> Result<Opts> {
    let file = load_settings_toml(dir);
    let mut opts = Opts::default();
    if let Ok(Some(ref f)) = file {
        apply_file_to_opts(f, &mut opts)?;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    setup_logging(opts.verbose);
    if let Err(msg) = file {
        warn!("Ignoring settings file: {}", msg);
    }

    if let Ok(ua) = std::env::var(PackagePaths::get().env_var("USER_AGENT")) {
        let ua = ua.trim();
        if !ua.is_empty() {
            opts.user_agent = ua.to_string();
        }
    }
    if let Some(press) = cli.press {
        opts.press = press;
    }
    if let Some(cap) = cli.queue_capacity {
        opts.queue_capacity = cap;
    }
    if let Some(n) = cli.max_attempts {
        opts.max_attempts = n;
    }
    if let Some(secs) = cli.timeout {
        opts.request_timeout = Duration::from_secs(secs);
    }
    if let Some(p) = cli.progress {
        opts.progress = p;
    }

    let date = today();
    let query = cli.query.as_deref();
    let detail = cli.detail.as_deref();
    opts.list_path = cli
        .list
        .clone()
        .unwrap_or_else(|| default_list_filename(opts.press, query, detail, date));
    opts.result_path = cli
        .result
        .clone()
        .unwrap_or_else(|| default_result_filename(opts.press, query, detail, date));
    Ok(opts)
}

fn query_from(cli: &Cli) -> Option<Query> {
    let term = cli.query.as_ref()?;
    let query = Query::new(term.as_str(), cli.number.unwrap_or(0))
        .with_secondary(cli.detail.clone().unwrap_or_default())
        .with_skip(cli.ignore);
    Some(query)
}

/// First Ctrl+C requests a graceful stop; a second one exits immediately.
fn install_cancel_handler(cancel: &CancelToken) -> Result<()> {
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(RunOutcome::Aborted.exit_code() as i32);
        }
        handler_token.cancel();
        warn!("Cancelling: no new searches; finishing articles already queued (Ctrl+C again to quit now)");
    })
    .context("set Ctrl+C handler")
}

fn print_summary(summary: &RunSummary) {
    debug!("{:#?}", summary);
    if summary.failed_items > 0 {
        info!(
            "{} article(s) could not be scraped; see warnings above",
            summary.failed_items
        );
    }
}

/// Run the mode selected by the flags. Returns the terminal outcome; argument and settings
/// errors are returned as `Err` before any worker starts.
pub fn handle_run(cli: &Cli) -> Result<RunOutcome> {
    let _ = dotenvy::dotenv();
    let cwd = std::env::current_dir().context("read working directory")?;
    let opts = setup_opts(cli, &cwd)?;

    if let Some(ref output) = cli.merge {
        let rows = merge_result_files(output, &cli.inputs)?;
        info!("Merged {} rows into {}", rows, output.display());
        return Ok(RunOutcome::Completed);
    }

    let mode = cli.mode().map_err(|e| anyhow!(e))?;
    let query = query_from(cli);
    if let Some(ref q) = query
        && mode != RunMode::Scrap
    {
        q.validate()?;
    }
    match mode {
        RunMode::Collect => info!("Writing references to {}", opts.list_path.display()),
        RunMode::Scrap => info!(
            "Reading {} and writing {}",
            opts.list_path.display(),
            opts.result_path.display()
        ),
        RunMode::Pipeline => info!(
            "Writing references to {} and articles to {}",
            opts.list_path.display(),
            opts.result_path.display()
        ),
    }

    let cancel = CancelToken::new();
    install_cancel_handler(&cancel)?;
    let summary = crate::run(mode, query.as_ref(), &opts, &cancel);
    print_summary(&summary);
    Ok(summary.outcome)
}
