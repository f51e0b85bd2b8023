//! Chosun Ilbo: JSON search API, 10 results per page, pages numbered from 0.

use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use std::sync::OnceLock;

use super::html::nth_text;
use super::http::HttpClient;
use super::paging::{PageWindow, PagedReferences};
use super::text::{clean_text, extract_date};
use super::{ReferenceStream, SourceAdapter};
use crate::error::ScrapeError;
use crate::{Query, Record, Reference};

pub const PER_PAGE: usize = 10;
const SEARCH_API: &str = "https://www.chosun.com/pf/api/v3/content/fetch/search-param-api";
const DATE_SELECTOR: &str = "#wv_wrap_id > div.wv_header > div.wv_header_date";
const TITLE_SELECTOR: &str = "#wv_wrap_id > div.wv_header > div.wv_header_title";
const BODY_SELECTOR: &str = "#wv_wrap_id > div.wv_newsbody";

fn article_url() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r".*article\.html\?id=\d+").expect("static regex"))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    content_elements: Vec<SearchElement>,
}

#[derive(Debug, Deserialize)]
struct SearchElement {
    #[serde(default)]
    article_view_url: String,
    #[serde(default)]
    title: String,
}

pub struct ChosunAdapter {
    http: HttpClient,
}

impl ChosunAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn fetch_page(&self, page: usize, query: &Query) -> Result<Vec<Reference>, ScrapeError> {
        let body = self
            .http
            .get_with_params(
                SEARCH_API,
                &[
                    ("query", search_param(page, query)),
                    ("d", "301".to_string()),
                    ("_website", "chosun".to_string()),
                ],
            )
            .map_err(ScrapeError::from_discovery_fetch)?;
        parse_search_response(&body)
    }
}

/// JSON parameter object the search API expects. Terms are URI-encoded inside it.
pub fn search_param(page: usize, query: &Query) -> String {
    serde_json::json!({
        "emd_word": urlencoding::encode(&query.secondary_term),
        "query": urlencoding::encode(&query.primary_term),
        "page": page,
        "date_period": "all",
        "encodeURI": "true",
        "expt_word": "",
        "field": "",
        "siteid": "www",
        "sort": "1",
        "writer": "",
    })
    .to_string()
}

impl SourceAdapter for ChosunAdapter {
    fn name(&self) -> &str {
        "chosun"
    }

    fn discover(&self, query: &Query) -> Result<ReferenceStream<'_>, ScrapeError> {
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

/// References in one API response. Elements without an article URL are dropped.
pub fn parse_search_response(body: &str) -> Result<Vec<Reference>, ScrapeError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ScrapeError::discovery(format!("bad search response: {e}")))?;
    Ok(response
        .content_elements
        .into_iter()
        .filter_map(|el| {
            let Some(m) = article_url().find(&el.article_view_url) else {
                log::debug!("Skipping non-article result {:?}", el.article_view_url);
                return None;
            };
            Some(Reference::new(m.as_str(), clean_text(&el.title)))
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
