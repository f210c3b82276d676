//! Site profiles and chapter extraction. Site registry, fetcher trait, shared client, and per-site body rules.

mod client;
mod error;

pub mod hameln;
pub mod narou;

pub use client::{PoliteClient, PoliteClientBuilder};
pub use error::ScraperError;

use crate::model::NovelSource;
use scraper::{Html, Selector};
use std::fmt;

/// User-Agent advertised to both sites. Default user agents may be throttled or blocked.
pub const USER_AGENT: &str = concat!(
    "novelfetch/",
    env!("CARGO_PKG_VERSION"),
    " (compatible; text crawler; reqwest)"
);

/// Seconds advertised in the Crawl-delay header.
const CRAWL_DELAY: &str = "3";

const HEADERS: &[(&str, &str)] = &[("User-agent", USER_AGENT), ("Crawl-delay", CRAWL_DELAY)];

/// Supported novel site. Used for profile lookup and extraction dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// Shosetsuka ni Narou (ncode.syosetu.com).
    Narou,
    /// Hameln (syosetu.org).
    Hameln,
}

impl Site {
    pub fn id(self) -> &'static str {
        match self {
            Site::Narou => "narou",
            Site::Hameln => "hameln",
        }
    }

    pub fn profile(self) -> &'static SiteProfile {
        match self {
            Site::Narou => &PROFILES[0],
            Site::Hameln => &PROFILES[1],
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Static per-site configuration: where chapter pages live and how to read them.
#[derive(Debug)]
pub struct SiteProfile {
    pub site: Site,
    /// Page URL with `{work}` and `{page}` slots.
    pub url_template: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
    /// Container holding the chapter text.
    pub body_selector: &'static str,
    /// Element whose text reads `current/total`.
    pub count_selector: &'static str,
}

impl SiteProfile {
    /// Substitute work identifier and page number into the URL template.
    pub fn page_url(&self, work_id: &str, page: u32) -> String {
        self.url_template
            .replace("{work}", work_id)
            .replace("{page}", &page.to_string())
    }
}

static PROFILES: [SiteProfile; 2] = [
    SiteProfile {
        site: Site::Narou,
        url_template: "https://ncode.syosetu.com/{work}/{page}/",
        headers: HEADERS,
        body_selector: "#novel_honbun",
        count_selector: "#novel_no",
    },
    SiteProfile {
        site: Site::Hameln,
        url_template: "https://syosetu.org/novel/{work}/{page}.html",
        headers: HEADERS,
        body_selector: "#honbun",
        count_selector: ".ss > div:first-of-type",
    },
];

/// Look up a site profile by identifier (`narou` or `hameln`, case-insensitive).
pub fn lookup(site_id: &str) -> Result<&'static SiteProfile, ScraperError> {
    PROFILES
        .iter()
        .find(|p| p.site.id().eq_ignore_ascii_case(site_id.trim()))
        .ok_or_else(|| ScraperError::UnknownSite {
            id: site_id.to_string(),
        })
}

/// Fetches one chapter page of a novel and returns the parsed document.
///
/// [PoliteClient] is the HTTP implementation; tests substitute canned pages.
pub trait PageFetcher {
    fn fetch_page(&mut self, source: &NovelSource, page: u32) -> Result<Html, ScraperError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &mut F {
    fn fetch_page(&mut self, source: &NovelSource, page: u32) -> Result<Html, ScraperError> {
        (**self).fetch_page(source, page)
    }
}

/// Parse a CSS selector or return a parse error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Read the total chapter count from the `current/total` indicator.
pub fn extract_count(doc: &Html, profile: &SiteProfile) -> Result<u32, ScraperError> {
    let sel = parse_selector(profile.count_selector)?;
    let el = doc
        .select(&sel)
        .next()
        .ok_or_else(|| ScraperError::MissingElement {
            selector: profile.count_selector.to_string(),
        })?;
    let text = el.text().collect::<String>();
    parse_count(&text)
}

fn parse_count(text: &str) -> Result<u32, ScraperError> {
    let malformed = || ScraperError::MalformedCount {
        text: text.trim().to_string(),
    };
    let (_, total) = text.rsplit_once('/').ok_or_else(malformed)?;
    total.trim().parse::<u32>().map_err(|_| malformed())
}

/// Assemble the chapter body using the site's text rule.
pub fn extract_body(doc: &Html, profile: &SiteProfile) -> Result<String, ScraperError> {
    let sel = parse_selector(profile.body_selector)?;
    let container = doc
        .select(&sel)
        .next()
        .ok_or_else(|| ScraperError::MissingElement {
            selector: profile.body_selector.to_string(),
        })?;
    let body = match profile.site {
        Site::Narou => narou::body_text(container),
        Site::Hameln => hameln::body_text(container),
    };
    Ok(body)
}
