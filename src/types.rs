//! Public and internal types for the presscrape API and pipeline.

use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScrapeError;

/// Search parameters for one run. Immutable once a run starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    /// Main search keyword.
    pub primary_term: String,
    /// Extra keyword the article must also contain (empty when unused).
    pub secondary_term: String,
    /// Number of references to emit after skipping.
    pub target_count: usize,
    /// Number of leading raw matches to discard.
    pub skip_count: usize,
}

impl Query {
    pub fn new(primary_term: impl Into<String>, target_count: usize) -> Self {
        Self {
            primary_term: primary_term.into(),
            secondary_term: String::new(),
            target_count,
            skip_count: 0,
        }
    }

    pub fn with_secondary(mut self, secondary_term: impl Into<String>) -> Self {
        self.secondary_term = secondary_term.into();
        self
    }

    pub fn with_skip(mut self, skip_count: usize) -> Self {
        self.skip_count = skip_count;
        self
    }

    /// Query for resuming after `emitted` references were already delivered.
    pub fn resume_after(&self, emitted: usize) -> Self {
        Self {
            primary_term: self.primary_term.clone(),
            secondary_term: self.secondary_term.clone(),
            target_count: self.target_count.saturating_sub(emitted),
            skip_count: self.skip_count.saturating_add(emitted),
        }
    }

    /// Reject queries no adapter can serve.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.primary_term.trim().is_empty() {
            return Err(ScrapeError::Configuration(
                "query term must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A discovered article pointer, not yet fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub url: String,
    pub title: String,
}

impl Reference {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Fully extracted article. Written once to the result sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    date: String,
    pub title: String,
    pub body: String,
}

impl Record {
    /// Build a record; `date` must be a real calendar date in `YYYY-MM-DD` form.
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, String> {
        let date = date.into();
        let well_formed = date.len() == 10
            && date
                .char_indices()
                .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
        if !well_formed || NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
            return Err(format!("date {date:?} is not YYYY-MM-DD"));
        }
        Ok(Self {
            date,
            title: title.into(),
            body: body.into(),
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}

/// Supported press sites. Each has its own adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Press {
    #[default]
    Joongang,
    Donga,
    Chosun,
}

impl Press {
    pub fn as_str(&self) -> &'static str {
        match self {
            Press::Joongang => "joongang",
            Press::Donga => "donga",
            Press::Chosun => "chosun",
        }
    }
}

impl fmt::Display for Press {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Press {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "joongang" => Ok(Press::Joongang),
            "donga" => Ok(Press::Donga),
            "chosun" => Ok(Press::Chosun),
            other => Err(ScrapeError::Configuration(format!(
                "unknown press {other:?} (expected joongang, donga or chosun)"
            ))),
        }
    }
}

/// Terminal state of a run. Exactly one is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Target reached or source exhausted.
    Completed,
    /// Cancelled by the user; sinks were closed cleanly.
    Aborted,
    /// Unrecoverable error (configuration, exhausted retries, sink I/O).
    Failed,
}

impl RunOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Failed => 1,
            RunOutcome::Aborted => 130,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunOutcome::Completed => "Completed",
            RunOutcome::Aborted => "Aborted",
            RunOutcome::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Counts reported to the caller once a run terminates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// References emitted by discovery (rows in the reference log).
    pub collected: usize,
    /// Leading raw matches discarded by skip accounting.
    pub ignored: usize,
    /// Records written to the result file.
    pub scraped: usize,
    /// References whose extraction failed and were skipped.
    pub failed_items: usize,
    /// Discovery attempts made, including the first.
    pub discovery_attempts: u32,
    /// Highest queue occupancy the producer observed right after an enqueue.
    pub max_queue_depth: usize,
    /// Message of the error that failed the run, if any.
    pub error: Option<String>,
}

impl RunSummary {
    pub fn new(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            collected: 0,
            ignored: 0,
            scraped: 0,
            failed_items: 0,
            discovery_attempts: 0,
            max_queue_depth: 0,
            error: None,
        }
    }

    pub fn failed(err: &ScrapeError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::new(RunOutcome::Failed)
        }
    }
}

/// Which stages to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Discovery only; writes the reference log.
    Collect,
    /// Extraction only; reads an existing reference log.
    Scrap,
    /// Discovery feeding extraction through the bounded queue.
    Pipeline,
}

/// Full options for a run (CLI and lib).
#[derive(Clone, Debug)]
pub struct Opts {
    pub press: Press,
    /// Reference log path (written by collect, read by scrap).
    pub list_path: PathBuf,
    /// Result file path.
    pub result_path: PathBuf,
    /// Bounded queue capacity between the stages. Minimum 1.
    pub queue_capacity: usize,
    /// Total discovery attempts allowed per run, including the first.
    pub max_attempts: u32,
    /// Delay before the first discovery retry.
    pub retry_delay: Duration,
    /// Upper bound on the retry delay.
    pub retry_max_delay: Duration,
    /// Per-request HTTP timeout handed to the adapter.
    pub request_timeout: Duration,
    /// HTTP user agent handed to the adapter.
    pub user_agent: String,
    /// Show kdam counters.
    pub progress: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        use crate::utils::config::Defaults;
        Self {
            press: Press::default(),
            list_path: PathBuf::new(),
            result_path: PathBuf::new(),
            queue_capacity: Defaults::QUEUE_CAPACITY,
            max_attempts: Defaults::MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(Defaults::RETRY_DELAY_MS),
            retry_max_delay: Duration::from_millis(Defaults::RETRY_MAX_DELAY_MS),
            request_timeout: Duration::from_secs(Defaults::REQUEST_TIMEOUT_SECS),
            user_agent: Defaults::USER_AGENT.to_string(),
            progress: false,
            verbose: false,
        }
    }
}
