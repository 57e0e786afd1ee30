// ABOUTME: Document and asset source contracts plus backend selection for a site.
// ABOUTME: Static sites use the HTTP source; interactive sites use the browser source when built with it.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::config::{Backend, SiteConfig};
use crate::error::HarvestError;
use crate::page::HtmlPage;

#[cfg(feature = "browser")]
pub mod browser;
pub mod http;

#[cfg(feature = "browser")]
pub use browser::BrowserSource;
pub use http::{FetchResult, HttpSource};

/// Loads listing and detail documents.
///
/// `ready` lists selectors the caller expects on the page. Sources that
/// render asynchronously wait, up to their configured limit, for one of
/// them to appear before taking the snapshot; the others ignore it.
#[async_trait(?Send)]
pub trait DocumentSource {
    async fn open(&self, url: &str, ready: &[String]) -> Result<HtmlPage, HarvestError>;

    /// Releases any resources held by the source.
    async fn close(&mut self) -> Result<(), HarvestError> {
        Ok(())
    }
}

/// Downloads image and video payloads.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_asset(&self, url: &str, timeout: Duration) -> Result<Bytes, HarvestError>;
}

/// Opens the document source selected by the site's backend.
pub async fn open_source(
    config: &SiteConfig,
    http: &HttpSource,
) -> Result<Box<dyn DocumentSource>, HarvestError> {
    match config.backend {
        Backend::Static => Ok(Box::new(http.with_headers(&config.headers))),
        Backend::Interactive => open_interactive(config).await,
    }
}

#[cfg(feature = "browser")]
async fn open_interactive(config: &SiteConfig) -> Result<Box<dyn DocumentSource>, HarvestError> {
    Ok(Box::new(BrowserSource::launch(config).await?))
}

#[cfg(not(feature = "browser"))]
async fn open_interactive(config: &SiteConfig) -> Result<Box<dyn DocumentSource>, HarvestError> {
    Err(HarvestError::config(
        "OpenSource",
        Some(anyhow::anyhow!(
            "{} uses the interactive backend; build with the `browser` feature",
            config.site
        )),
    ))
}
