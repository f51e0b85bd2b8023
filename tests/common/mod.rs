//! Shared fixtures: an in-memory adapter with scripted pages, failures and latency.

#![allow(dead_code)]

use presscrape::adapter::{PageWindow, PagedReferences, ReferenceStream, SourceAdapter};
use presscrape::pipeline::CancelToken;
use presscrape::{Opts, Query, Record, Reference, ScrapeError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the adapter saw, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Raw position handed to discovery.
    Pull(usize),
    /// Extraction started for this raw position.
    Extract(usize),
}

pub fn url_for(position: usize) -> String {
    format!("https://news.example.com/article/{position}")
}

fn position_of(url: &str) -> usize {
    url.rsplit('/').next().and_then(|s| s.parse().ok()).unwrap()
}

pub fn raw_refs(n: usize) -> Vec<Reference> {
    (0..n)
        .map(|i| Reference::new(url_for(i), format!("title {i}")))
        .collect()
}

pub struct ScriptedAdapter {
    raw: Vec<Reference>,
    page_size: usize,
    /// Pages that fail the first time they are fetched.
    fail_once: Mutex<HashSet<usize>>,
    /// Pages that always fail.
    fail_always: HashSet<usize>,
    /// Raw positions whose extraction fails.
    bad_articles: HashSet<usize>,
    /// Raw positions whose extraction fails with an error that is not per item.
    fatal_articles: HashSet<usize>,
    extract_delay: Duration,
    /// Cancel this token once this many extractions have started.
    cancel_after: Option<(usize, CancelToken)>,
    pub pages_fetched: AtomicUsize,
    pub discover_calls: AtomicUsize,
    extracts: AtomicUsize,
    pub events: Mutex<Vec<Event>>,
}

impl ScriptedAdapter {
    pub fn new(raw: Vec<Reference>, page_size: usize) -> Self {
        Self {
            raw,
            page_size,
            fail_once: Mutex::new(HashSet::new()),
            fail_always: HashSet::new(),
            bad_articles: HashSet::new(),
            fatal_articles: HashSet::new(),
            extract_delay: Duration::ZERO,
            cancel_after: None,
            pages_fetched: AtomicUsize::new(0),
            discover_calls: AtomicUsize::new(0),
            extracts: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_page_once(self, page: usize) -> Self {
        self.fail_once.lock().unwrap().insert(page);
        self
    }

    pub fn failing_page_always(mut self, page: usize) -> Self {
        self.fail_always.insert(page);
        self
    }

    pub fn bad_article(mut self, position: usize) -> Self {
        self.bad_articles.insert(position);
        self
    }

    pub fn fatal_article(mut self, position: usize) -> Self {
        self.fatal_articles.insert(position);
        self
    }

    pub fn extract_delay(mut self, delay: Duration) -> Self {
        self.extract_delay = delay;
        self
    }

    pub fn cancel_after(mut self, extracts: usize, token: CancelToken) -> Self {
        self.cancel_after = Some((extracts, token));
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn fetch_page(&self, page: usize) -> Result<Vec<Reference>, ScrapeError> {
        self.pages_fetched.fetch_add(1, Ordering::SeqCst);
        if self.fail_always.contains(&page) || self.fail_once.lock().unwrap().remove(&page) {
            return Err(ScrapeError::discovery(format!("page {page} unavailable")));
        }
        let start = (page * self.page_size).min(self.raw.len());
        let end = ((page + 1) * self.page_size).min(self.raw.len());
        Ok(self.raw[start..end].to_vec())
    }
}

impl SourceAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        "scripted"
    }

    fn discover(&self, query: &Query) -> Result<ReferenceStream<'_>, ScrapeError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        let window = PageWindow::for_query(query, self.page_size);
        let mut position = window.pre_skipped;
        let pages = PagedReferences::new(window, move |page| self.fetch_page(page)).map(move |r| {
            if r.is_ok() {
                self.events.lock().unwrap().push(Event::Pull(position));
                position += 1;
            }
            r
        });
        Ok(ReferenceStream::new(window.pre_skipped, pages))
    }

    fn extract(&self, url: &str) -> Result<Record, ScrapeError> {
        let position = position_of(url);
        self.events.lock().unwrap().push(Event::Extract(position));
        let started = self.extracts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((n, token)) = &self.cancel_after
            && started >= *n
        {
            token.cancel();
        }
        if !self.extract_delay.is_zero() {
            std::thread::sleep(self.extract_delay);
        }
        if self.fatal_articles.contains(&position) {
            return Err(ScrapeError::Configuration(format!("no parser for {url}")));
        }
        if self.bad_articles.contains(&position) {
            return Err(ScrapeError::extraction(url, "layout changed"));
        }
        Record::new("2021-03-04", format!("title {position}"), format!("body {position}"))
            .map_err(|e| ScrapeError::extraction(url, e))
    }
}

/// Options writing into `dir`, with millisecond retry delays.
pub fn test_opts(dir: &Path) -> Opts {
    Opts {
        list_path: dir.join("list.csv"),
        result_path: dir.join("result.csv"),
        retry_delay: Duration::from_millis(1),
        retry_max_delay: Duration::from_millis(5),
        ..Opts::default()
    }
}

/// Data lines of a written file (header dropped).
pub fn data_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}
