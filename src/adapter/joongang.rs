//! Joongang Ilbo: HTML search pages of 10 results, pages numbered from 1.

use scraper::Html;

use super::html::{all_text, element_text, nth_text, selector};
use super::http::HttpClient;
use super::paging::{PageWindow, PagedReferences};
use super::text::{clean_text, extract_date};
use super::{ReferenceStream, SourceAdapter};
use crate::error::ScrapeError;
use crate::{Query, Record, Reference};

pub const PER_PAGE: usize = 10;
const SEARCH_URL: &str = "https://news.joins.com/search/JoongangNews";
const LINK_SELECTOR: &str = "#content > div.section_news > div.bd > ul > li > div > h2 > a";
// [0] is the byline, [1] the first publication date, [2] the last update.
const DATE_SELECTOR: &str = "div.article_head > div.clearfx > div.byline > em";
const TITLE_SELECTOR: &str = "#article_title";
const BODY_SELECTOR: &str = "#article_body";

pub struct JoongangAdapter {
    http: HttpClient,
}

impl JoongangAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn fetch_page(&self, page: usize, query: &Query) -> Result<Vec<Reference>, ScrapeError> {
        let params = [
            ("page", (page + 1).to_string()),
            ("Keyword", query.primary_term.clone()),
            ("SortType", "New".to_string()),
            ("SearchCategoryType", "JoongangNews".to_string()),
            ("IncludeKeyword", query.secondary_term.clone()),
        ];
        let html = self
            .http
            .get_with_params(SEARCH_URL, &params)
            .map_err(ScrapeError::from_discovery_fetch)?;
        parse_search_page(&html)
    }
}

impl SourceAdapter for JoongangAdapter {
    fn name(&self) -> &str {
        "joongang"
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

/// References listed on one search result page.
pub fn parse_search_page(html: &str) -> Result<Vec<Reference>, ScrapeError> {
    let doc = Html::parse_document(html);
    let sel = selector(LINK_SELECTOR).map_err(ScrapeError::discovery)?;
    Ok(doc
        .select(&sel)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some(Reference::new(href, clean_text(&element_text(a))))
        })
        .collect())
}

/// Article page to record. The body may be split over several elements.
pub fn parse_article(url: &str, html: &str) -> Result<Record, ScrapeError> {
    let doc = Html::parse_document(html);
    let date_text = nth_text(&doc, DATE_SELECTOR, 1, url, "publication date")?;
    let date = extract_date(&date_text)
        .ok_or_else(|| ScrapeError::extraction(url, format!("no date in {date_text:?}")))?;
    let title = clean_text(&nth_text(&doc, TITLE_SELECTOR, 0, url, "title")?);
    let body = all_text(&doc, BODY_SELECTOR, url, "body")?
        .iter()
        .map(|t| clean_text(t))
        .collect::<String>();
    Record::new(date, title, body).map_err(|e| ScrapeError::extraction(url, e))
}
