//! Blocking HTTP client that sends each site's courtesy headers. One GET per call, no retries.

use crate::model::NovelSource;
use crate::scraper::{PageFetcher, ScraperError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Url;
use scraper::Html;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client for chapter pages.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
    user_agent: Option<String>,
}

impl PoliteClient {
    /// Build a client with the profile User-Agent and default timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }

    /// Headers for one request: the profile's set, with User-agent replaced when overridden.
    fn headers_for(&self, source: &NovelSource) -> Result<HeaderMap, ScraperError> {
        let mut headers = HeaderMap::new();
        for (name, value) in source.profile().headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ScraperError::InvalidHeader {
                    name: (*name).to_string(),
                    reason: e.to_string(),
                }
            })?;
            if name == USER_AGENT && self.user_agent.is_some() {
                continue;
            }
            let value = HeaderValue::from_str(value).map_err(|e| ScraperError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(name, value);
        }
        if let Some(ua) = &self.user_agent {
            let value = HeaderValue::from_str(ua).map_err(|e| ScraperError::InvalidHeader {
                name: USER_AGENT.to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(USER_AGENT, value);
        }
        Ok(headers)
    }

    /// GET a page and return its body. Non-2xx is an error.
    pub fn get_text(&self, url: &str, headers: HeaderMap) -> Result<String, ScraperError> {
        let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            input: url.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .get(parsed)
            .headers(headers)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        check_response(response, url)
    }
}

impl PageFetcher for PoliteClient {
    fn fetch_page(&mut self, source: &NovelSource, page: u32) -> Result<Html, ScraperError> {
        let url = source.page_url(page);
        let headers = self.headers_for(source)?;
        let body = self.get_text(&url, headers)?;
        Ok(Html::parse_document(&body))
    }
}

/// Check response status and read body as text. Returns body or ScraperError.
fn check_response(response: reqwest::blocking::Response, url: &str) -> Result<String, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response.text().map_err(|e| ScraperError::BodyRead {
        url: url.to_string(),
        source: e,
    })
}

/// Builder for PoliteClient with optional User-Agent override and timeout.
#[derive(Debug)]
pub struct PoliteClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for PoliteClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PoliteClientBuilder {
    /// Replace the profile User-Agent. If not set, the descriptive default is sent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    pub fn build(self) -> Result<PoliteClient, reqwest::Error> {
        let inner = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(PoliteClient {
            inner,
            user_agent: self.user_agent,
        })
    }
}
