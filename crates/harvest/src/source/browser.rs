// ABOUTME: Interactive document source driving Chromium through chromiumoxide.
// ABOUTME: Each open gets its own tab, waits for an expected node, snapshots the rendered DOM and closes the tab.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use super::DocumentSource;
use crate::config::SiteConfig;
use crate::error::HarvestError;
use crate::page::HtmlPage;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A launched browser plus its CDP event loop.
pub struct BrowserSource {
    browser: Browser,
    handler: JoinHandle<()>,
    wait_timeout: Duration,
}

impl BrowserSource {
    /// Launches a browser for the site, headless unless the site says otherwise.
    pub async fn launch(config: &SiteConfig) -> Result<Self, HarvestError> {
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(|e| {
            HarvestError::context(
                &config.site,
                "LaunchBrowser",
                Some(anyhow::anyhow!("browser config: {}", e)),
            )
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            HarvestError::context(&config.site, "LaunchBrowser", Some(anyhow::Error::new(e)))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser handler event error");
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        })
    }

    /// Polls for any of the expected selectors. Returns false on timeout.
    async fn wait_for_any(&self, page: &Page, ready: &[String]) -> bool {
        if ready.is_empty() {
            return true;
        }
        let start = Instant::now();
        loop {
            for selector in ready {
                if page.find_element(selector.as_str()).await.is_ok() {
                    debug!(selector = %selector, elapsed = ?start.elapsed(), "node appeared");
                    return true;
                }
            }
            if start.elapsed() >= self.wait_timeout {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn snapshot(&self, page: &Page, url: &str, ready: &[String]) -> Result<String, HarvestError> {
        page.wait_for_navigation().await.map_err(|e| {
            HarvestError::timeout(url, "Navigate", Some(anyhow::Error::new(e)))
        })?;
        if !self.wait_for_any(page, ready).await {
            warn!(
                url,
                timeout_secs = self.wait_timeout.as_secs(),
                "expected nodes did not appear; fields will be absent"
            );
        }
        page.content()
            .await
            .map_err(|e| HarvestError::context(url, "Snapshot", Some(anyhow::Error::new(e))))
    }
}

#[async_trait(?Send)]
impl DocumentSource for BrowserSource {
    async fn open(&self, url: &str, ready: &[String]) -> Result<HtmlPage, HarvestError> {
        let base = Url::parse(url).map_err(|e| {
            HarvestError::invalid_url(url, "OpenContext", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        let page = self.browser.new_page(url).await.map_err(|e| {
            HarvestError::context(url, "OpenContext", Some(anyhow::Error::new(e)))
        })?;

        let content = self.snapshot(&page, url, ready).await;
        if let Err(e) = page.close().await {
            debug!(url, error = %e, "closing tab failed");
        }
        Ok(HtmlPage::parse(Some(base), &content?))
    }

    async fn close(&mut self) -> Result<(), HarvestError> {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        self.handler.abort();
        Ok(())
    }
}
