//! Stateless text helpers shared by every press adapter.

use regex::Regex;
use std::sync::OnceLock;

/// Runs of characters an article keeps nothing of: anything outside Hangul syllables,
/// ASCII alphanumerics, space and a small set of punctuation.
fn character_filter() -> &'static Regex {
    static FILTER: OnceLock<Regex> = OnceLock::new();
    FILTER.get_or_init(|| {
        Regex::new(r"[^ 가-힣a-zA-Z0-9\[\]()\-~?!.,:;%]+").expect("static regex")
    })
}

fn spaces() -> &'static Regex {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    SPACES.get_or_init(|| Regex::new(r" {2,}").expect("static regex"))
}

fn date_pattern() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| {
        Regex::new(r"((?:19|20)\d{2})[-.](0[1-9]|1[0-2])[-.]([012][0-9]|3[01])")
            .expect("static regex")
    })
}

/// Replace unwanted characters with a space, collapse repeated spaces and trim.
pub fn clean_text(text: &str) -> String {
    let filtered = character_filter().replace_all(text, " ");
    spaces().replace_all(&filtered, " ").trim().to_string()
}

/// First `YYYY-MM-DD` / `YYYY.MM.DD` found in `text`, normalised to `YYYY-MM-DD`.
pub fn extract_date(text: &str) -> Option<String> {
    date_pattern()
        .captures(text)
        .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]))
}
