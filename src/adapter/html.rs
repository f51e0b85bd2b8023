//! Small helpers over `scraper` used by the article parsers.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;

/// Compile a CSS selector; a bad selector is a bug in the adapter, reported as a parse error.
pub fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("bad selector {css:?}: {e}"))
}

/// Concatenated text of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text of the `nth` element matching `css`, or an extraction error naming `what`.
pub fn nth_text(doc: &Html, css: &str, nth: usize, url: &str, what: &str) -> Result<String, ScrapeError> {
    let sel = selector(css).map_err(|e| ScrapeError::extraction(url, e))?;
    doc.select(&sel)
        .nth(nth)
        .map(element_text)
        .ok_or_else(|| ScrapeError::extraction(url, format!("missing {what}")))
}

/// Text of every element matching `css`. Errors when nothing matches.
pub fn all_text(doc: &Html, css: &str, url: &str, what: &str) -> Result<Vec<String>, ScrapeError> {
    let sel = selector(css).map_err(|e| ScrapeError::extraction(url, e))?;
    let texts: Vec<String> = doc.select(&sel).map(element_text).collect();
    if texts.is_empty() {
        return Err(ScrapeError::extraction(url, format!("missing {what}")));
    }
    Ok(texts)
}
