//! Application configuration constants.
//! Defaults and package-derived names in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Settings file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable `<PKG>_<name>`.
    pub fn env_var(&self, name: &str) -> String {
        format!("{}_{}", self.env_prefix, name)
    }
}

// ---- Run defaults ----

pub struct Defaults;

impl Defaults {
    /// Queue capacity between collecting and scraping.
    pub const QUEUE_CAPACITY: usize = 5000;
    /// Total discovery attempts per run, including the first.
    pub const MAX_ATTEMPTS: u32 = 5;
    /// Delay before the first discovery retry; doubles each retry.
    pub const RETRY_DELAY_MS: u64 = 500;
    pub const RETRY_MAX_DELAY_MS: u64 = 10_000;
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
}

// ---- Output file names ----

pub const LIST_FILE_PREFIX: &str = "articles_list";
pub const RESULT_FILE_PREFIX: &str = "articles_scrap";
pub const OUTPUT_EXTENSION: &str = "csv";
