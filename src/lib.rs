//! novelfetch: CLI fetcher for Shosetsuka ni Narou and Hameln novels, writing one text file per chapter.

pub mod cli;
pub mod config;
pub mod download;
pub mod model;
pub mod output;
pub mod paginate;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use download::{download, DownloadError, DownloadOptions, DownloadSummary};
pub use model::{Chapter, NovelSource};
pub use output::{encode_legacy, FallbackTable, OutputError, OutputWriter};
pub use paginate::{Chapters, POLITENESS_DELAY};
pub use crate::scraper::{
    extract_body, extract_count, lookup, PageFetcher, PoliteClient, PoliteClientBuilder,
    ScraperError, Site, SiteProfile,
};
