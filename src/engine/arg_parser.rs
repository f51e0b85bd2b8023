use clap::Parser;
use std::path::PathBuf;

use crate::{Press, RunMode};

struct DefaultArgs;

impl DefaultArgs {
    pub const IGNORE: &'static str = "0";
}

/// Collect press article references for a query and scrape their contents.
#[derive(Clone, Debug, Parser)]
#[command(name = "presscrape")]
#[command(about = "Collect article references (--collect) and/or scrape articles (--scrap).")]
pub struct Cli {
    /// Press to scrape. Default: joongang (or `press` in .presscrape.toml).
    #[arg(long, short = 'p', value_enum)]
    pub press: Option<Press>,

    /// Collect article references for a query.
    #[arg(long, short = 'c')]
    pub collect: bool,

    /// Number of references to collect.
    #[arg(long, short = 'n')]
    pub number: Option<usize>,

    /// Main search keyword.
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Additional keyword the article must contain.
    #[arg(long, short = 'd')]
    pub detail: Option<String>,

    /// Number of leading search results to ignore.
    #[arg(long, short = 'i', default_value = DefaultArgs::IGNORE)]
    pub ignore: usize,

    /// Scrape article contents. Reads --list unless combined with --collect.
    #[arg(long, short = 's')]
    pub scrap: bool,

    /// Reference log file. Default: derived from press, query and today's date.
    #[arg(long, short = 'l', visible_alias = "list-file")]
    pub list: Option<PathBuf>,

    /// Result file. Default: derived from press, query and today's date.
    #[arg(long, short = 'r', visible_alias = "result-file")]
    pub result: Option<PathBuf>,

    /// Merge result files INPUT... into this file, keeping the first header only.
    #[arg(long, value_name = "OUTPUT", conflicts_with_all = ["collect", "scrap"])]
    pub merge: Option<PathBuf>,

    /// Result files to merge (with --merge).
    #[arg(value_name = "INPUT", requires = "merge")]
    pub inputs: Vec<PathBuf>,

    /// Capacity of the queue between collecting and scraping.
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Total collect attempts before giving up on a failing search.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show progress counters.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Which stages to run, checking the flag combinations each needs.
    pub fn mode(&self) -> Result<RunMode, String> {
        if self.collect && (self.number.is_none() || self.query.is_none()) {
            return Err("--collect needs --number and --query".to_string());
        }
        match (self.collect, self.scrap) {
            (true, true) => Ok(RunMode::Pipeline),
            (true, false) => Ok(RunMode::Collect),
            (false, true) if self.list.is_none() => {
                Err("--scrap without --collect needs --list".to_string())
            }
            (false, true) => Ok(RunMode::Scrap),
            (false, false) => Err("nothing to do: pass --collect and/or --scrap".to_string()),
        }
    }
}
