//! Fetch target and chapter data passed between the driver and the writer.

use crate::scraper::{ScraperError, Site, SiteProfile};

/// One novel on one site. Built only through [NovelSource::new], which validates the work identifier.
#[derive(Debug, Clone)]
pub struct NovelSource {
    profile: &'static SiteProfile,
    work_id: String,
}

impl NovelSource {
    /// Validate `work_id` for `site` and pair it with the site's profile.
    ///
    /// Narou codes are `n` + at least four digits + letters (e.g. `n2267be`), normalized to lowercase.
    /// Hameln codes are decimal (e.g. `157686`).
    pub fn new(site: Site, work_id: &str) -> Result<Self, ScraperError> {
        let work_id = normalize_work_id(site, work_id)?;
        Ok(Self {
            profile: site.profile(),
            work_id,
        })
    }

    pub fn site(&self) -> Site {
        self.profile.site
    }

    pub fn profile(&self) -> &'static SiteProfile {
        self.profile
    }

    pub fn work_id(&self) -> &str {
        &self.work_id
    }

    pub fn page_url(&self, page: u32) -> String {
        self.profile.page_url(&self.work_id, page)
    }
}

fn normalize_work_id(site: Site, input: &str) -> Result<String, ScraperError> {
    let trimmed = input.trim();
    let invalid = |hint: &'static str| ScraperError::InvalidWorkId {
        site,
        work_id: input.to_string(),
        hint,
    };
    match site {
        Site::Narou => {
            let code = trimmed.to_ascii_lowercase();
            let rest = code
                .strip_prefix('n')
                .ok_or_else(|| invalid("narou codes start with 'n', e.g. n2267be"))?;
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            let letters = &rest[digits..];
            if digits < 4 || letters.is_empty() || !letters.chars().all(|c| c.is_ascii_lowercase())
            {
                return Err(invalid("expected 'n', four or more digits, then letters"));
            }
            Ok(code)
        }
        Site::Hameln => {
            if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("hameln novel ids are decimal, e.g. 157686"));
            }
            Ok(trimmed.to_string())
        }
    }
}

/// One extracted chapter: 1-based index and plain text with `\n` line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub index: u32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narou_code_is_lowercased() -> Result<(), ScraperError> {
        let source = NovelSource::new(Site::Narou, " N2267BE ")?;
        assert_eq!(source.work_id(), "n2267be");
        assert_eq!(source.page_url(1), "https://ncode.syosetu.com/n2267be/1/");
        Ok(())
    }

    #[test]
    fn narou_rejects_malformed_codes() {
        for bad in ["", "2267be", "n22be", "n2267", "n2267b3", "x2267be"] {
            assert!(
                matches!(
                    NovelSource::new(Site::Narou, bad),
                    Err(ScraperError::InvalidWorkId { .. })
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn hameln_accepts_decimal_ids() -> Result<(), ScraperError> {
        let source = NovelSource::new(Site::Hameln, "157686")?;
        assert_eq!(source.site(), Site::Hameln);
        assert_eq!(source.page_url(2), "https://syosetu.org/novel/157686/2.html");
        Ok(())
    }

    #[test]
    fn hameln_rejects_non_decimal_ids() {
        for bad in ["", "n2267be", "12a", "-5"] {
            assert!(
                NovelSource::new(Site::Hameln, bad).is_err(),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
