//! Download loop: drive [Chapters] and hand each chapter to the [OutputWriter].
//!
//! The first failure aborts the run. Files written for earlier chapters stay on disk so a later
//! run can resume with a start index.

use crate::model::NovelSource;
use crate::output::{FallbackTable, OutputError, OutputWriter};
use crate::paginate::Chapters;
use crate::scraper::{PageFetcher, ScraperError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

/// Errors that end a download run.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Start chapter must be 1 or greater (got {start}).")]
    InvalidStart { start: u32 },

    #[error("Interrupted.")]
    Interrupted,
}

/// Options for one run: start index, legacy copies, progress callback, interruption flag.
pub struct DownloadOptions<'a> {
    /// 1-based chapter to start from.
    pub start: u32,
    /// Also write Shift_JIS copies using this table. `None` writes UTF-8 only.
    pub legacy: Option<&'a FallbackTable>,
    /// Called after each chapter is written with (index, total).
    pub progress: Option<&'a dyn Fn(u32, u32)>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for DownloadOptions<'_> {
    fn default() -> Self {
        Self {
            start: 1,
            legacy: None,
            progress: None,
            cancel: None,
        }
    }
}

/// What a finished run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub total: u32,
    pub written: u32,
    pub first: Option<u32>,
    pub last: Option<u32>,
}

/// Fetch chapters `options.start..=count` and write each one before fetching the next.
pub fn download<F: PageFetcher>(
    fetcher: F,
    source: &NovelSource,
    writer: &OutputWriter,
    options: &DownloadOptions<'_>,
) -> Result<DownloadSummary, DownloadError> {
    let mut chapters = Chapters::new(fetcher, source, options.start);
    if let Some(flag) = &options.cancel {
        chapters = chapters.with_cancel(Arc::clone(flag));
    }
    let mut summary = DownloadSummary {
        total: 0,
        written: 0,
        first: None,
        last: None,
    };
    while let Some(chapter) = chapters.next() {
        let chapter = chapter?;
        let total = chapters.total().unwrap_or(chapter.index);
        let primary = writer.write_primary(chapter.index, &chapter.text)?;
        tracing::debug!(path = %primary.display(), "wrote chapter");
        if let Some(fallback) = options.legacy {
            let legacy = writer.write_legacy(&primary, fallback)?;
            tracing::debug!(path = %legacy.display(), "wrote legacy copy");
        }
        summary.first.get_or_insert(chapter.index);
        summary.last = Some(chapter.index);
        summary.written += 1;
        if let Some(progress) = options.progress {
            progress(chapter.index, total);
        }
    }
    summary.total = chapters.total().unwrap_or(0);
    tracing::info!(
        work = source.work_id(),
        written = summary.written,
        total = summary.total,
        "download finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::LEGACY_DIR;
    use crate::paginate::testing::FakeSite;
    use crate::scraper::Site;
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn source() -> NovelSource {
        NovelSource::new(Site::Narou, "n2267be").expect("valid ncode")
    }

    #[test]
    fn failure_on_chapter_two_keeps_chapter_one_only() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source();
        let writer = OutputWriter::create(tmp.path().join(source.work_id()), false)?;
        let mut site = FakeSite::new(3);
        site.fail_on = Some(2);
        let options = DownloadOptions {
            start: 1,
            ..Default::default()
        };

        let result = download(&mut site, &source, &writer, &options);
        assert!(matches!(
            result,
            Err(DownloadError::Scraper(ScraperError::HttpStatus { .. }))
        ));
        assert!(writer.root().join("001.txt").exists());
        assert!(!writer.root().join("002.txt").exists());
        assert!(!writer.root().join("003.txt").exists());
        Ok(())
    }

    #[test]
    fn writes_each_chapter_and_reports_progress() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source();
        let writer = OutputWriter::create(tmp.path(), true)?;
        let mut site = FakeSite::new(3);
        let seen = RefCell::new(Vec::new());
        let progress = |index: u32, total: u32| seen.borrow_mut().push((index, total));
        let fallback = FallbackTable::default();
        let options = DownloadOptions {
            start: 2,
            legacy: Some(&fallback),
            progress: Some(&progress),
            cancel: None,
        };

        let summary = download(&mut site, &source, &writer, &options)?;
        assert_eq!(
            summary,
            DownloadSummary {
                total: 3,
                written: 2,
                first: Some(2),
                last: Some(3),
            }
        );
        assert_eq!(*seen.borrow(), vec![(2, 3), (3, 3)]);
        assert!(!tmp.path().join("001.txt").exists());
        assert_eq!(std::fs::read_to_string(tmp.path().join("002.txt"))?, "chapter 2");
        assert_eq!(
            std::fs::read(tmp.path().join(LEGACY_DIR).join("003.txt"))?,
            b"chapter 3".to_vec()
        );
        Ok(())
    }

    #[test]
    fn interrupted_run_stops_before_fetching() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source();
        let writer = OutputWriter::create(tmp.path(), false)?;
        let mut site = FakeSite::new(3);
        let options = DownloadOptions {
            start: 1,
            cancel: Some(Arc::new(AtomicBool::new(true))),
            ..Default::default()
        };
        let result = download(&mut site, &source, &writer, &options);
        assert!(matches!(result, Err(DownloadError::Interrupted)));
        assert!(site.calls.is_empty());
        Ok(())
    }
}
