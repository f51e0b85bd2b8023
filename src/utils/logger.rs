//! Colored env_logger setup for the CLI.

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Dependencies log warnings only; this crate logs at Info, or Debug when `verbose`.
/// `RUST_LOG` still applies on top. Safe to call more than once.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let line = match record.level() {
                Level::Error => format!("[{} {}] {}", name, "ERROR".red(), record.args()),
                Level::Warn => format!("[{} {}] {}", name, "WARN".yellow(), record.args()),
                Level::Info => format!("[{}] {}", name, record.args()),
                Level::Debug | Level::Trace => {
                    let stage = record
                        .target()
                        .rsplit("::")
                        .next()
                        .unwrap_or_default()
                        .dimmed();
                    format!("[{} {}] {}", name, stage, record.args())
                }
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
