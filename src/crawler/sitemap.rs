//! Sitemap parsing
//!
//! Reads `<loc>` values from a sitemap document using the standard sitemap
//! namespace. Documents that omit the namespace are read with a plain
//! `//loc` query instead.

use sxd_document::parser;
use sxd_xpath::{Context, Factory, Value};
use thiserror::Error;

/// Standard sitemap namespace
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Errors raised while reading a sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to parse sitemap XML: {0}")]
    Parse(String),

    #[error("Invalid XPath: {0}")]
    XPath(String),

    #[error("Failed to evaluate '{expression}': {reason}")]
    Evaluate { expression: String, reason: String },
}

/// Extracts every non-empty `<loc>` value in document order
///
/// # Example
///
/// ```
/// use sumi_scribe::crawler::parse_sitemap;
///
/// let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
/// <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://example.com/a</loc></url>
///   <url><loc>https://example.com/b</loc></url>
/// </urlset>"#;
///
/// let locs = parse_sitemap(xml).unwrap();
/// assert_eq!(locs, vec!["https://example.com/a", "https://example.com/b"]);
/// ```
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let package = parser::parse(xml).map_err(|e| SitemapError::Parse(e.to_string()))?;
    let document = package.as_document();

    let factory = Factory::new();
    let mut context = Context::new();
    context.set_namespace("sm", SITEMAP_NAMESPACE);

    for expression in ["//sm:loc", "//loc"] {
        let xpath = factory
            .build(expression)
            .map_err(|e| SitemapError::XPath(format!("{} ({})", expression, e)))?
            .ok_or_else(|| SitemapError::XPath(expression.to_string()))?;

        let value = xpath
            .evaluate(&context, document.root())
            .map_err(|e| SitemapError::Evaluate {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;

        if let Value::Nodeset(nodeset) = value {
            let locs: Vec<String> = nodeset
                .document_order()
                .into_iter()
                .map(|node| node.string_value().trim().to_string())
                .filter(|loc| !loc.is_empty())
                .collect();

            if !locs.is_empty() {
                return Ok(locs);
            }
        }
    }

    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced_sitemap() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc> https://example.com/one </loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://example.com/two</loc></url>
  <url><loc>https://example.com/three</loc></url>
</urlset>"#;

        let locs = parse_sitemap(xml).unwrap();
        assert_eq!(
            locs,
            vec![
                "https://example.com/one",
                "https://example.com/two",
                "https://example.com/three"
            ]
        );
    }

    #[test]
    fn test_parse_sitemap_without_namespace() {
        let xml = "<urlset><url><loc>https://example.com/x</loc></url></urlset>";
        assert_eq!(parse_sitemap(xml).unwrap(), vec!["https://example.com/x"]);
    }

    #[test]
    fn test_empty_sitemap() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></urlset>"#;
        assert!(parse_sitemap(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_sitemap() {
        let err = parse_sitemap("<html><body>Not found").unwrap_err();
        assert!(matches!(err, SitemapError::Parse(_)));
    }
}
