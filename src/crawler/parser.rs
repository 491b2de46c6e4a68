//! HTML parser for extracting links
//!
//! Only `<a href>` anchors are considered. Hrefs are reported exactly as
//! written in the document; resolving them into canonical URLs is left to
//! the link handler.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Raw href values of every candidate link, in document order
    pub links: Vec<String>,

    /// Number of anchors that were skipped
    pub skipped: usize,
}

/// Parses HTML content and extracts links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, including `download` and
///   `rel="nofollow"` anchors
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only and empty hrefs (same page anchors)
///
/// # Example
///
/// ```
/// use link_vis::crawler::parse_html;
///
/// let html = r#"<html><body><a href="example.com/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.links, vec!["example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    extract_links(&document)
}

fn extract_links(document: &Html) -> ParsedPage {
    let mut page = ParsedPage::default();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return page;
    };

    for href in document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
    {
        if is_followable(href) {
            page.links.push(href.to_string());
        } else {
            page.skipped += 1;
        }
    }

    page
}

/// Returns false for hrefs that can never name another page:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only and empty hrefs
fn is_followable(href: &str) -> bool {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lowered = href.to_ascii_lowercase();
    !["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}
