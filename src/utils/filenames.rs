//! Default output file names derived from the query and the date.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::Press;
use crate::utils::config::{LIST_FILE_PREFIX, OUTPUT_EXTENSION, RESULT_FILE_PREFIX};

fn derive(prefix: &str, press: Press, query: Option<&str>, detail: Option<&str>, date: NaiveDate) -> PathBuf {
    let mut parts = vec![prefix.to_string(), press.as_str().to_string()];
    for term in [query, detail].into_iter().flatten() {
        let term = term.trim();
        if !term.is_empty() {
            parts.push(term.replace(['/', '\\', ' '], "_"));
        }
    }
    parts.push(date.format("%Y-%m-%d").to_string());
    PathBuf::from(format!("{}.{}", parts.join("_"), OUTPUT_EXTENSION))
}

/// `articles_list_<press>[_<query>][_<detail>]_<date>.csv`
pub fn default_list_filename(press: Press, query: Option<&str>, detail: Option<&str>, date: NaiveDate) -> PathBuf {
    derive(LIST_FILE_PREFIX, press, query, detail, date)
}

/// `articles_scrap_<press>[_<query>][_<detail>]_<date>.csv`
pub fn default_result_filename(press: Press, query: Option<&str>, detail: Option<&str>, date: NaiveDate) -> PathBuf {
    derive(RESULT_FILE_PREFIX, press, query, detail, date)
}

/// Today's local date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
