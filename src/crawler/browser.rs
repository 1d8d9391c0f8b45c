//! Headless-browser fetch strategy
//!
//! One browser process is launched per crawl run and shut down when the run
//! ends. Pages are rendered strictly one at a time: the browser sits behind
//! a mutex and the fetcher reports a parallelism of 1.

use crate::crawler::fetcher::{FetchError, FetchRequest, FetchResult, PageFetcher};
use crate::ScribeError;
use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Fetcher that returns the DOM after JavaScript has run
pub struct RenderedFetcher {
    browser: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    settle_delay: Duration,
    capture_screenshots: bool,
}

impl RenderedFetcher {
    /// Launches a local headless Chrome/Chromium
    ///
    /// `user_agent` is applied to every page opened by this fetcher.
    pub async fn launch(
        settle_delay: Duration,
        capture_screenshots: bool,
        user_agent: &str,
    ) -> Result<Self, ScribeError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(30))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", user_agent))
            .build()
            .map_err(ScribeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScribeError::Browser(e.to_string()))?;

        // The CDP event loop must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Launched headless browser");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler,
            settle_delay,
            capture_screenshots,
        })
    }

    async fn render(&self, page: &Page, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        page.goto(request.url.as_str())
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Fixed settle delay; no readiness polling
        tokio::time::sleep(self.settle_delay).await;

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let screenshot = if self.capture_screenshots {
            match page
                .screenshot(ScreenshotParams::builder().full_page(true).build())
                .await
            {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!("Screenshot failed for {}: {}", request.url, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(FetchResult::ok(request.url.clone(), html, None).with_screenshot(screenshot))
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        let guard = self.browser.lock().await;
        let Some(browser) = guard.as_ref() else {
            return FetchResult::failed(
                request.url.clone(),
                FetchError::Browser("browser already shut down".to_string()),
            );
        };

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                return FetchResult::failed(request.url.clone(), FetchError::Browser(e.to_string()))
            }
        };

        let budget = request.timeout + self.settle_delay;
        let result = match tokio::time::timeout(budget, self.render(&page, request)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => FetchResult::failed(request.url.clone(), e),
            Err(_) => FetchResult::failed(request.url.clone(), FetchError::Timeout),
        };

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", request.url, e);
        }

        result
    }

    fn max_parallelism(&self) -> Option<usize> {
        Some(1)
    }

    async fn shutdown(&self) {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return;
        };

        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        tracing::info!("Headless browser shut down");
    }
}
