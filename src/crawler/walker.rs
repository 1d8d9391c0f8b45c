//! Article discovery from a seed URL
//!
//! Three discovery modes share one fetcher:
//! - **Pagination**: follow "next page" anchors, unioning each listing
//!   page's links, until no anchor is found or it points at a page already
//!   visited
//! - **Sitemap**: read `<origin>/sitemap.xml`, falling back to the seed
//!   itself when the sitemap is missing or empty
//! - **Single page**: the links of the seed page only
//!
//! The seed being unreachable is the one fatal condition here.

use crate::article::CrawlWarning;
use crate::config::{CrawlerConfig, DiscoveryMode};
use crate::crawler::fetcher::{FetchRequest, FetchResult, PageFetcher};
use crate::crawler::parser::{extract_links, find_next_page};
use crate::crawler::sitemap::parse_sitemap;
use crate::url::{origin_of, parse_http_url, same_origin, visit_key, KeywordFilter, LinkSet};
use crate::ScribeError;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Links found by one discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Article URLs in discovery order
    pub links: LinkSet,

    /// True when the sitemap fallback reduced the run to the seed page
    pub seed_only: bool,

    /// Listing pages (or sitemap documents) fetched
    pub pages_fetched: u64,

    /// Non-fatal problems met while walking
    pub warnings: Vec<CrawlWarning>,
}

impl Discovery {
    fn seed_only(seed: &Url, pages_fetched: u64) -> Self {
        let mut links = LinkSet::new();
        links.insert(seed.to_string());
        Self {
            links,
            seed_only: true,
            pages_fetched,
            warnings: Vec::new(),
        }
    }
}

/// Drives the fetcher across listing pages
pub struct Walker<'a> {
    fetcher: &'a dyn PageFetcher,
    config: &'a CrawlerConfig,
    filter: &'a KeywordFilter,
}

impl<'a> Walker<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        config: &'a CrawlerConfig,
        filter: &'a KeywordFilter,
    ) -> Self {
        Self {
            fetcher,
            config,
            filter,
        }
    }

    fn request(&self, url: Url) -> FetchRequest {
        FetchRequest::new(
            url,
            self.config.fetch_strategy,
            Duration::from_secs(self.config.timeout_secs),
        )
    }

    /// Fetches a page that the run cannot continue without
    async fn fetch_required(&self, url: &Url) -> Result<FetchResult, ScribeError> {
        let result = self.fetcher.fetch(&self.request(url.clone())).await;
        if result.is_ok() {
            Ok(result)
        } else {
            Err(ScribeError::SeedUnreachable {
                url: url.to_string(),
                reason: result.error_message(),
            })
        }
    }

    /// Discovers article links using the configured mode
    pub async fn discover(&self, seed: &Url) -> Result<Discovery, ScribeError> {
        tracing::info!(
            "Discovering articles from {} ({:?} mode)",
            seed,
            self.config.discovery_mode
        );

        let discovery = match self.config.discovery_mode {
            DiscoveryMode::Pagination => self.paginate(seed).await?,
            DiscoveryMode::Sitemap => self.read_sitemap(seed).await,
            DiscoveryMode::SinglePage => self.single_page(seed).await?,
        };

        tracing::info!(
            "Discovered {} links from {} after {} fetches",
            discovery.links.len(),
            seed,
            discovery.pages_fetched
        );
        Ok(discovery)
    }

    /// Walks the "next page" chain starting at `seed`
    ///
    /// Terminates after at most one fetch per distinct listing page, capped
    /// by `max-pages`. Listing pages themselves are removed from the result.
    pub async fn paginate(&self, seed: &Url) -> Result<Discovery, ScribeError> {
        let mut discovery = Discovery::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut accumulated = LinkSet::new();
        let mut current = seed.clone();

        loop {
            if discovery.pages_fetched >= u64::from(self.config.max_pages) {
                tracing::warn!(
                    "Stopping pagination at {} listing pages (max-pages)",
                    self.config.max_pages
                );
                break;
            }

            visited.insert(visit_key(&current));

            let result = if discovery.pages_fetched == 0 {
                self.fetch_required(&current).await?
            } else {
                let result = self.fetcher.fetch(&self.request(current.clone())).await;
                if !result.is_ok() {
                    tracing::warn!("Listing page {} failed: {}", current, result.error_message());
                    discovery.warnings.push(CrawlWarning {
                        url: current.to_string(),
                        message: result.error_message(),
                    });
                    discovery.pages_fetched += 1;
                    break;
                }
                result
            };
            discovery.pages_fetched += 1;

            let html = result.body.unwrap_or_default();
            let added = accumulated.extend_from(extract_links(&html, &current, self.filter));
            tracing::debug!("Listing page {} added {} links", current, added);

            match find_next_page(&html, &current, &self.config.next_labels) {
                Some(next) if visited.contains(&visit_key(&next)) => {
                    tracing::debug!("Next page {} already visited, stopping", next);
                    break;
                }
                Some(next) if !same_origin(&next, seed) => {
                    tracing::warn!("Next page {} leaves the seed's site, stopping", next);
                    discovery.warnings.push(CrawlWarning {
                        url: next.to_string(),
                        message: "pagination left the seed's site".to_string(),
                    });
                    break;
                }
                Some(next) => current = next,
                None => break,
            }
        }

        discovery.links = accumulated
            .into_iter()
            .filter(|link| match Url::parse(link) {
                Ok(url) => !visited.contains(&visit_key(&url)),
                Err(_) => true,
            })
            .collect();

        Ok(discovery)
    }

    /// Reads the sitemap at the seed's origin
    ///
    /// Never fails: an unreachable, malformed or empty sitemap yields the
    /// seed as the only page.
    pub async fn read_sitemap(&self, seed: &Url) -> Discovery {
        let Some(sitemap_url) = origin_of(seed).and_then(|origin| origin.join("sitemap.xml").ok())
        else {
            return Discovery::seed_only(seed, 0);
        };

        let result = self.fetcher.fetch(&self.request(sitemap_url.clone())).await;
        let Some(body) = result.body.as_deref().filter(|_| result.is_ok()) else {
            tracing::info!(
                "Sitemap {} unavailable ({}), using the seed page only",
                sitemap_url,
                result.error_message()
            );
            return Discovery::seed_only(seed, 1);
        };

        let locs = match parse_sitemap(body) {
            Ok(locs) => locs,
            Err(e) => {
                tracing::info!("{}; using the seed page only", e);
                return Discovery::seed_only(seed, 1);
            }
        };

        let mut links = LinkSet::new();
        for loc in locs {
            match parse_http_url(&loc) {
                Ok(url) => {
                    links.insert(url.to_string());
                }
                Err(e) => tracing::debug!("Skipping sitemap entry '{}': {}", loc, e),
            }
        }

        if links.is_empty() {
            tracing::info!("Sitemap {} lists no pages, using the seed page only", sitemap_url);
            return Discovery::seed_only(seed, 1);
        }

        Discovery {
            links,
            seed_only: false,
            pages_fetched: 1,
            warnings: Vec::new(),
        }
    }

    /// Extracts the links of the seed page
    pub async fn single_page(&self, seed: &Url) -> Result<Discovery, ScribeError> {
        let result = self.fetch_required(seed).await?;
        let html = result.body.unwrap_or_default();

        Ok(Discovery {
            links: extract_links(&html, seed, self.filter),
            seed_only: false,
            pages_fetched: 1,
            warnings: Vec::new(),
        })
    }
}
