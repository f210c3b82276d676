//! Sequential chapter iteration: read the chapter count from page 1 once, then fetch each page
//! from the start index to the count, pausing between requests.

use crate::download::DownloadError;
use crate::model::{Chapter, NovelSource};
use crate::scraper::{extract_body, extract_count, PageFetcher, ScraperError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pause between successive requests to the same site.
pub const POLITENESS_DELAY: Duration = Duration::from_secs(1);

/// Granularity at which the pause checks for interruption.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Lazy, single-pass sequence of chapters for one novel.
///
/// The first call to `next` fetches page 1 to learn the chapter count; the count is never
/// re-read. After the first error the iterator yields `None`.
pub struct Chapters<'a, F> {
    fetcher: F,
    source: &'a NovelSource,
    start: u32,
    next: u32,
    total: Option<u32>,
    delay: Duration,
    cancel: Option<Arc<AtomicBool>>,
    requested: bool,
    done: bool,
}

impl<'a, F: PageFetcher> Chapters<'a, F> {
    /// Iterate chapters `start..=count`. `start` is 1-based.
    pub fn new(fetcher: F, source: &'a NovelSource, start: u32) -> Self {
        Self {
            fetcher,
            source,
            start,
            next: start,
            total: None,
            delay: POLITENESS_DELAY,
            cancel: None,
            requested: false,
            done: false,
        }
    }

    /// Stop with [DownloadError::Interrupted] once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Chapter count, once page 1 has been read.
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Sleep the politeness delay before every request but the first.
    fn pause(&mut self) -> Result<(), DownloadError> {
        if self.requested {
            let mut remaining = self.delay;
            while !remaining.is_zero() {
                if self.cancelled() {
                    return Err(DownloadError::Interrupted);
                }
                let step = remaining.min(CANCEL_POLL);
                std::thread::sleep(step);
                remaining -= step;
            }
        }
        if self.cancelled() {
            return Err(DownloadError::Interrupted);
        }
        self.requested = true;
        Ok(())
    }

    fn read_total(&mut self) -> Result<u32, DownloadError> {
        if self.start < 1 {
            return Err(DownloadError::InvalidStart { start: self.start });
        }
        self.pause()?;
        let doc = self.fetcher.fetch_page(self.source, 1)?;
        let count = extract_count(&doc, self.source.profile())?;
        if count < 1 {
            return Err(ScraperError::NoChapters { count }.into());
        }
        tracing::info!(
            site = %self.source.site(),
            work = self.source.work_id(),
            count,
            start = self.start,
            "chapter count read"
        );
        Ok(count)
    }

    fn fetch_chapter(&mut self, index: u32) -> Result<Chapter, DownloadError> {
        self.pause()?;
        let doc = self.fetcher.fetch_page(self.source, index)?;
        let text = extract_body(&doc, self.source.profile())?;
        tracing::debug!(index, chars = text.chars().count(), "chapter extracted");
        Ok(Chapter { index, text })
    }

    fn step(&mut self) -> Option<Result<Chapter, DownloadError>> {
        let total = match self.total {
            Some(total) => total,
            None => match self.read_total() {
                Ok(total) => {
                    self.total = Some(total);
                    total
                }
                Err(e) => return Some(Err(e)),
            },
        };
        if self.next > total {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.fetch_chapter(index))
    }
}

impl<F: PageFetcher> Iterator for Chapters<'_, F> {
    type Item = Result<Chapter, DownloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake fetcher serving generated pages.

    use crate::model::NovelSource;
    use crate::scraper::{PageFetcher, ScraperError};
    use scraper::Html;
    use std::time::Instant;

    /// Serves a narou-shaped page for each index; records every request.
    pub(crate) struct FakeSite {
        pub total: u32,
        pub fail_on: Option<u32>,
        pub calls: Vec<(u32, Instant)>,
    }

    impl FakeSite {
        pub(crate) fn new(total: u32) -> Self {
            Self {
                total,
                fail_on: None,
                calls: Vec::new(),
            }
        }

        pub(crate) fn pages(&self) -> Vec<u32> {
            self.calls.iter().map(|(page, _)| *page).collect()
        }
    }

    impl PageFetcher for FakeSite {
        fn fetch_page(&mut self, source: &NovelSource, page: u32) -> Result<Html, ScraperError> {
            self.calls.push((page, Instant::now()));
            if self.fail_on == Some(page) {
                return Err(ScraperError::HttpStatus {
                    status: 503,
                    url: source.page_url(page),
                });
            }
            Ok(Html::parse_document(&format!(
                "<html><body><div id=\"novel_no\">{page}/{total}</div>\
                 <div id=\"novel_honbun\">chapter {page}</div></body></html>",
                page = page,
                total = self.total
            )))
        }
    }
}
