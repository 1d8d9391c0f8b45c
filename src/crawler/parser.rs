//! HTML parser for extracting links
//!
//! This module handles parsing listing pages to extract:
//! - Same-origin article links, minus keyword-excluded ones
//! - The "next page" anchor used by pagination mode

use crate::url::{same_origin, KeywordFilter, LinkSet};
use scraper::{Html, Selector};
use url::Url;

/// Extracts same-origin links from HTML and drops keyword matches
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` that resolves to the same origin as `base_url`
///   (root-relative and relative hrefs always do)
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Off-site links
/// - URLs containing any keyword of `filter`
///
/// # Example
///
/// ```
/// use sumi_scribe::crawler::extract_links;
/// use sumi_scribe::url::KeywordFilter;
/// use url::Url;
///
/// let html = r#"<a href="/a">A</a><a href="/subscribe">S</a><a href="https://other.com/">O</a>"#;
/// let base = Url::parse("https://example.com/list").unwrap();
/// let links = extract_links(html, &base, &KeywordFilter::default());
/// assert_eq!(links.into_vec(), vec!["https://example.com/a"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url, filter: &KeywordFilter) -> LinkSet {
    let document = Html::parse_document(html);
    let mut links = LinkSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute) = resolve_link(href, base_url) else {
            continue;
        };

        if !same_origin(&absolute, base_url) {
            tracing::trace!("Skipping off-site link {}", absolute);
            continue;
        }

        if let Some(keyword) = filter.matched_keyword(absolute.as_str()) {
            tracing::trace!("Excluding {} (keyword '{}')", absolute, keyword);
            continue;
        }

        links.insert(absolute.to_string());
    }

    links
}

/// Finds the "next page" link by exact anchor text
///
/// The anchor's text is trimmed and compared exactly against each label.
/// Returns the first matching anchor's resolved URL.
pub fn find_next_page(html: &str, base_url: &Url, labels: &[String]) -> Option<Url> {
    let document = Html::parse_document(html);
    let a_selector = Selector::parse("a[href]").ok()?;

    document
        .select(&a_selector)
        .filter(|element| {
            let text = element.text().collect::<String>();
            let text = text.trim();
            labels.iter().any(|label| label.trim() == text)
        })
        .find_map(|element| resolve_link(element.value().attr("href")?, base_url))
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => Some(absolute_url),
        _ => None,
    }
}
