//! Dong-a Ilbo: HTML search pages of 15 results addressed by a 1-based item offset.
//! The search page mixes articles with other content; only `/news/article/` links are kept.

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

use super::html::{element_text, nth_text, selector};
use super::http::HttpClient;
use super::paging::{PageWindow, PagedReferences};
use super::text::{clean_text, extract_date};
use super::{ReferenceStream, SourceAdapter};
use crate::error::ScrapeError;
use crate::{Query, Record, Reference};

pub const PER_PAGE: usize = 15;
const SEARCH_URL: &str = "https://www.donga.com/news/search";
const LINK_SELECTOR: &str =
    "#content > div.searchContWrap > div.searchCont > div.searchList > div.t > p.tit > a";
// [0] is the first publication date, [1] the last update.
const DATE_SELECTOR: &str = "#container > div.article_title > div.title_foot > span.date01";
const TITLE_SELECTOR: &str = "#container > div.article_title > h1";
const BODY_SELECTOR: &str = "#content > div > div.article_txt";

fn article_href() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| Regex::new(r".+/news/article/.+").expect("static regex"))
}

pub struct DongaAdapter {
    http: HttpClient,
}

impl DongaAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn fetch_page(&self, page: usize, query: &Query) -> Result<Vec<Reference>, ScrapeError> {
        let params = [
            ("p", (1 + page * PER_PAGE).to_string()),
            ("query", query.primary_term.clone()),
            ("check_news", "1".to_string()),
            ("more", "1".to_string()),
            ("sorting", "1".to_string()),
            ("search_date", "1".to_string()),
            ("v1", String::new()),
            ("v2", String::new()),
            ("range", "2".to_string()),
        ];
        let html = self
            .http
            .get_with_params(SEARCH_URL, &params)
            .map_err(ScrapeError::from_discovery_fetch)?;
        parse_search_page(&html)
    }
}

impl SourceAdapter for DongaAdapter {
    fn name(&self) -> &str {
        "donga"
    }

    fn discover(&self, query: &Query) -> Result<ReferenceStream<'_>, ScrapeError> {
        if !query.secondary_term.is_empty() {
            log::warn!(
                "donga search has no include-keyword filter; ignoring {:?}",
                query.secondary_term
            );
        }
        let window = PageWindow::for_query(query, PER_PAGE);
        let query = query.clone();
        let pages = PagedReferences::new(window, move |page| self.fetch_page(page, &query));
        Ok(ReferenceStream::new(window.pre_skipped, pages))
    }

    fn extract(&self, url: &str) -> Result<Record, ScrapeError> {
        let html = self
            .http
            .get_text(url)
            .map_err(|e| ScrapeError::from_extraction_fetch(url, e))?;
        parse_article(url, &html)
    }
}

/// Article references on one search page, non-article links dropped.
pub fn parse_search_page(html: &str) -> Result<Vec<Reference>, ScrapeError> {
    let doc = Html::parse_document(html);
    let sel = selector(LINK_SELECTOR).map_err(ScrapeError::discovery)?;
    Ok(doc
        .select(&sel)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            article_href()
                .is_match(href)
                .then(|| Reference::new(href, clean_text(&element_text(a))))
        })
        .collect())
}

pub fn parse_article(url: &str, html: &str) -> Result<Record, ScrapeError> {
    let doc = Html::parse_document(html);
    let date_text = nth_text(&doc, DATE_SELECTOR, 0, url, "publication date")?;
    let date = extract_date(&date_text)
        .ok_or_else(|| ScrapeError::extraction(url, format!("no date in {date_text:?}")))?;
    let title = clean_text(&nth_text(&doc, TITLE_SELECTOR, 0, url, "title")?);
    let body = clean_text(&nth_text(&doc, BODY_SELECTOR, 0, url, "body")?);
    Record::new(date, title, body).map_err(|e| ScrapeError::extraction(url, e))
}
