//! Shared error type for site lookup, fetching, and chapter extraction.

use crate::scraper::Site;
use thiserror::Error;

/// Errors raised while resolving a site, fetching a page, or extracting chapter text.
#[derive(Debug, Error)]
pub enum ScraperError {
    // Site / work identifier
    #[error("Unknown site '{id}'. Supported sites: narou, hameln.")]
    UnknownSite { id: String },

    #[error("Invalid work identifier for {site}: '{work_id}' ({hint})")]
    InvalidWorkId {
        site: Site,
        work_id: String,
        hint: &'static str,
    },

    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    // Parsing
    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Could not parse page: no element matches {selector:?} (the site layout may have changed).")]
    MissingElement { selector: String },

    #[error("Could not read chapter count from {text:?}: expected 'current/total'.")]
    MalformedCount { text: String },

    #[error("Work has no chapters (count {count}).")]
    NoChapters { count: u32 },
}
