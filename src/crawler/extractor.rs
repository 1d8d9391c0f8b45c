//! Article content extraction
//!
//! Two interchangeable policies select the article text:
//! - **Heuristic**: the first `article`/`div`/`section` (document order)
//!   whose direct `<p>` children outnumber the threshold
//! - **Flat**: every `<p>` on the page, optionally with headings
//!
//! Images are collected from the whole page either way.

use crate::config::{ExtractionConfig, ExtractionPolicy};
use crate::url::KeywordFilter;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted text and image references of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub images: Vec<String>,
}

/// Configured content extractor
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    policy: ExtractionPolicy,
    min_paragraphs: usize,
    include_headings: bool,
    image_filter: Option<KeywordFilter>,
}

impl ContentExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            policy: config.policy,
            min_paragraphs: config.min_paragraphs,
            include_headings: config.include_headings,
            image_filter: None,
        }
    }

    /// Drops image URLs matching the filter's keywords
    pub fn with_image_filter(mut self, filter: KeywordFilter) -> Self {
        self.image_filter = Some(filter);
        self
    }

    /// Extracts text and images from a fetched page
    ///
    /// Never fails: a page without a qualifying container yields empty text.
    pub fn extract(&self, html: &str, base_url: &Url) -> ExtractedContent {
        let document = Html::parse_document(html);

        let text = match self.policy {
            ExtractionPolicy::Heuristic => heuristic_text(&document, self.min_paragraphs),
            ExtractionPolicy::Flat => flat_text(&document, self.include_headings),
        };

        let mut images = collect_images(&document, base_url);
        if let Some(filter) = &self.image_filter {
            images.retain(|src| !filter.is_excluded(src));
        }

        ExtractedContent { text, images }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first container with more than `threshold` direct paragraphs
fn heuristic_text(document: &Html, threshold: usize) -> String {
    let Ok(containers) = Selector::parse("article, div, section") else {
        return String::new();
    };

    for container in document.select(&containers) {
        let paragraphs: Vec<ElementRef<'_>> = container
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "p")
            .collect();

        if paragraphs.len() > threshold {
            return paragraphs
                .into_iter()
                .map(element_text)
                .collect::<Vec<_>>()
                .join("\n");
        }
    }

    String::new()
}

fn flat_text(document: &Html, include_headings: bool) -> String {
    let selector = if include_headings {
        "h1, h2, h3, h4, h5, h6, p"
    } else {
        "p"
    };
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };

    document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Image sources in document order, resolved against `base_url`
///
/// `src` wins; `data-src` is the lazy-load fallback. Inline data URIs are
/// skipped.
fn collect_images(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(img_selector) = Selector::parse("img") else {
        return Vec::new();
    };

    document
        .select(&img_selector)
        .filter_map(|img| {
            let element = img.value();
            let src = element
                .attr("src")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .or_else(|| element.attr("data-src").map(str::trim))
                .filter(|s| !s.is_empty())?;

            if src.to_ascii_lowercase().starts_with("data:") {
                return None;
            }

            base_url.join(src).ok().map(|url| url.to_string())
        })
        .collect()
}
