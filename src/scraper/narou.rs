//! Shosetsuka ni Narou body rule. Paragraph breaks are already newline-delimited in the markup,
//! so the container's text is returned as-is.

use scraper::ElementRef;

/// Full inner text of `#novel_honbun`, verbatim.
pub(crate) fn body_text(container: ElementRef<'_>) -> String {
    container.text().collect()
}

#[cfg(test)]
mod tests {
    use crate::scraper::{extract_body, ScraperError, Site};
    use scraper::Html;

    #[test]
    fn body_is_returned_verbatim() -> Result<(), ScraperError> {
        let doc = Html::parse_document(
            "<html><body><div id=\"novel_honbun\">Hello\nWorld</div></body></html>",
        );
        assert_eq!(extract_body(&doc, Site::Narou.profile())?, "Hello\nWorld");
        Ok(())
    }

    #[test]
    fn paragraph_markup_keeps_source_newlines() -> Result<(), ScraperError> {
        let html = "<html><body><div id=\"novel_honbun\" class=\"novel_view\">\
<p id=\"L1\">　吾輩は猫である。</p>\n<p id=\"L2\"><br /></p>\n<p id=\"L3\">　名前はまだ無い。</p>\
</div></body></html>";
        let doc = Html::parse_document(html);
        let body = extract_body(&doc, Site::Narou.profile())?;
        assert_eq!(body, "　吾輩は猫である。\n\n　名前はまだ無い。");
        Ok(())
    }

    #[test]
    fn ruby_text_is_inlined() -> Result<(), ScraperError> {
        let html = "<html><body><div id=\"novel_honbun\">\
<p><ruby>漢字<rp>(</rp><rt>かんじ</rt><rp>)</rp></ruby>です</p></div></body></html>";
        let doc = Html::parse_document(html);
        let body = extract_body(&doc, Site::Narou.profile())?;
        assert_eq!(body, "漢字(かんじ)です");
        Ok(())
    }
}
