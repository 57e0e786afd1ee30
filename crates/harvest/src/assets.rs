// ABOUTME: Asset persistence: fetch a resolved image or video once and hand the bytes to an asset store.
// ABOUTME: Blob URLs short-circuit without a fetch; any failure degrades to no local path.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::HarvestError;
use crate::normalize::link::is_blob;
use crate::source::AssetFetcher;

/// The two kinds of media saved per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Image => "jpg",
            AssetKind::Video => "mp4",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
        };
        write!(f, "{}", s)
    }
}

/// Writes fetched media to its per-site, per-kind location.
pub trait AssetStore: Send + Sync {
    /// Stores the payload and returns where it was written.
    fn save(&self, site: &str, kind: AssetKind, bytes: &[u8]) -> Result<PathBuf, HarvestError>;
}

/// Fetches `url` once and stores it. Returns the local path, or `None` when
/// the URL is a blob, the fetch fails or the store rejects the payload.
pub async fn persist_asset(
    fetcher: &dyn AssetFetcher,
    store: &dyn AssetStore,
    site: &str,
    kind: AssetKind,
    url: &str,
    timeout: Duration,
) -> Option<String> {
    if is_blob(url) {
        debug!(site, %kind, url, "blob url is not fetchable");
        return None;
    }
    let result = match fetcher.fetch_asset(url, timeout).await {
        Ok(bytes) => store.save(site, kind, &bytes),
        Err(e) => Err(e),
    };
    match result {
        Ok(path) => {
            debug!(site, %kind, path = %path.display(), "asset saved");
            Some(path.display().to_string())
        }
        Err(e) => {
            warn!(site, %kind, url, error = %e, "asset not saved");
            None
        }
    }
}
