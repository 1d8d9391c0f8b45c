//! Crawler module for article discovery, fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind one interface for every fetch strategy
//! - Link extraction, keyword filtering and pagination/sitemap discovery
//! - Content extraction and content-fingerprint deduplication
//! - A bounded worker pool with a single join barrier
//! - Overall crawl coordination

mod aggregator;
#[cfg(feature = "rendered")]
mod browser;
mod coordinator;
mod dedup;
mod extractor;
mod fetcher;
mod parser;
mod scheduler;
mod sitemap;
mod walker;

pub use aggregator::{Aggregator, PageOutcome};
#[cfg(feature = "rendered")]
pub use browser::RenderedFetcher;
pub use coordinator::{run_crawl, Coordinator};
pub use dedup::DedupIndex;
pub use extractor::{ContentExtractor, ExtractedContent};
pub use fetcher::{
    build_http_client, fetch_url, FetchError, FetchRequest, FetchResult, FetchStatus, HttpFetcher,
    PageFetcher, RetryPolicy, RetryingFetcher, BROWSER_USER_AGENT,
};
pub use parser::{extract_links, find_next_page};
pub use scheduler::WorkerPool;
pub use sitemap::{parse_sitemap, SitemapError, SITEMAP_NAMESPACE};
pub use walker::{Discovery, Walker};

use crate::article::CrawlResult;
use crate::config::Config;
use crate::ScribeError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the fetcher for the configured strategy
/// 2. Discover article links for every seed
/// 3. Fetch and extract articles concurrently
/// 4. Drop duplicate content and return the ordered result
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed successfully
/// * `Err(ScribeError)` - Crawl failed (invalid config or unreachable seed)
pub async fn crawl(config: Config) -> Result<CrawlResult, ScribeError> {
    run_crawl(config).await
}
