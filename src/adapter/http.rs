//! Blocking HTTP client shared by the adapters. Maps transport failures onto [`FetchError`].

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::error::{FetchError, ScrapeError};

/// Request settings handed to every adapter.
#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl From<&crate::Opts> for HttpConfig {
    fn from(opts: &crate::Opts) -> Self {
        Self {
            timeout: opts.request_timeout,
            user_agent: opts.user_agent.clone(),
        }
    }
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en;q=0.5"),
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ScrapeError::Configuration(format!("build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `base` with `params` url-encoded into the query string.
    pub fn get_with_params(&self, base: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let url = reqwest::Url::parse_with_params(base, params.iter().map(|(k, v)| (*k, v.as_str())))
            .map_err(|e| FetchError::InvalidUrl {
                url: base.to_string(),
                reason: e.to_string(),
            })?;
        self.get_text(url.as_str())
    }

    /// GET `url` and return the body. Non-2xx statuses are errors.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| classify(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| classify(url, e))
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: err,
        }
    }
}
