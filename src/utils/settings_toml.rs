//! Load `.presscrape.toml` from a directory (CLI only). The lib takes everything through `Opts`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PresscrapeToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    press: Option<String>,
    queue_capacity: Option<usize>,
    max_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    retry_max_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    progress: Option<bool>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is no file; a file that does not
/// parse is returned as an error message for the caller to report.
pub(crate) fn load_settings_toml(dir: &Path) -> Result<Option<PresscrapeToml>, String> {
    let path = dir.join(PackagePaths::get().config_filename());
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Ok(None);
    };
    toml::from_str(&s)
        .map(Some)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &PresscrapeToml, opts: &mut Opts) -> Result<(), crate::error::ScrapeError> {
    let sec = &file.settings;
    if let Some(ref press) = sec.press {
        opts.press = press.parse()?;
    }
    apply_file_opt!(sec, opts, queue_capacity => queue_capacity);
    apply_file_opt!(sec, opts, max_attempts => max_attempts);
    apply_file_opt!(sec, opts, user_agent => user_agent);
    apply_file_opt!(sec, opts, progress => progress);
    apply_file_opt!(sec, opts, verbose => verbose);
    if let Some(ms) = sec.retry_delay_ms {
        opts.retry_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = sec.retry_max_delay_ms {
        opts.retry_max_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = sec.request_timeout_secs {
        opts.request_timeout = Duration::from_secs(secs);
    }
    Ok(())
}

/// Parse settings from a TOML string (used by tests and tools that keep settings elsewhere).
pub fn opts_from_toml_str(s: &str, mut opts: Opts) -> Result<Opts, crate::error::ScrapeError> {
    let file: PresscrapeToml = toml::from_str(s)
        .map_err(|e| crate::error::ScrapeError::Configuration(format!("settings: {e}")))?;
    apply_file_to_opts(&file, &mut opts)?;
    Ok(opts)
}
