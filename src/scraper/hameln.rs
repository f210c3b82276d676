//! Hameln body rule. Each immediate child element of `#honbun` is one paragraph.

use scraper::ElementRef;

/// Texts of the container's child elements, joined with a single newline.
/// Bare text nodes between children (markup whitespace) are ignored.
pub(crate) fn body_text(container: ElementRef<'_>) -> String {
    container
        .children()
        .filter_map(ElementRef::wrap)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::scraper::{extract_body, ScraperError, Site};
    use scraper::Html;

    #[test]
    fn children_are_joined_with_newlines() -> Result<(), ScraperError> {
        let doc = Html::parse_document(
            "<html><body><div id=\"honbun\"><p>A</p><p>B</p><p>C</p></div></body></html>",
        );
        assert_eq!(extract_body(&doc, Site::Hameln.profile())?, "A\nB\nC");
        Ok(())
    }

    #[test]
    fn whitespace_between_children_is_not_a_paragraph() -> Result<(), ScraperError> {
        let doc = Html::parse_document(
            "<html><body><div id=\"honbun\">\n  <p id=\"0\">一</p>\n  <p id=\"1\">二</p>\n</div></body></html>",
        );
        assert_eq!(extract_body(&doc, Site::Hameln.profile())?, "一\n二");
        Ok(())
    }

    #[test]
    fn empty_paragraphs_are_kept_as_blank_lines() -> Result<(), ScraperError> {
        let doc = Html::parse_document(
            "<html><body><div id=\"honbun\"><p>A</p><p><br></p><p>B</p></div></body></html>",
        );
        assert_eq!(extract_body(&doc, Site::Hameln.profile())?, "A\n\nB");
        Ok(())
    }
}
