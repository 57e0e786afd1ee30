// ABOUTME: Media vault writing downloaded images and videos under the data directory.
// ABOUTME: Images are re-encoded as JPEG; videos are written as fetched.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use sitetrawl_harvest::{AssetKind, AssetStore, HarvestError};
use tracing::debug;

use crate::error::LedgerError;
use crate::paths::DataLayout;

pub const DEFAULT_JPEG_QUALITY: u8 = 50;

/// [`AssetStore`] writing to `Pictures/<Site>/` and `Videos/<Site>/`.
///
/// Each kind has its own counter, so file names stay unique within a run
/// even when several assets are saved in the same second.
#[derive(Debug)]
pub struct MediaVault {
    layout: DataLayout,
    quality: u8,
    images: AtomicUsize,
    videos: AtomicUsize,
}

impl MediaVault {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            quality: DEFAULT_JPEG_QUALITY,
            images: AtomicUsize::new(0),
            videos: AtomicUsize::new(0),
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    fn next_path(&self, site: &str, kind: AssetKind) -> PathBuf {
        let counter = match kind {
            AssetKind::Image => &self.images,
            AssetKind::Video => &self.videos,
        };
        let n = counter.fetch_add(1, Ordering::SeqCst);
        self.layout
            .media_file(site, kind, Local::now().naive_local(), n)
    }

    fn write(&self, site: &str, kind: AssetKind, bytes: &[u8]) -> Result<PathBuf, LedgerError> {
        let payload = match kind {
            AssetKind::Image => reencode_jpeg(bytes, self.quality)?,
            AssetKind::Video => bytes.to_vec(),
        };
        let dir = self.layout.media_dir(site, kind);
        fs::create_dir_all(&dir).map_err(|e| LedgerError::io(&dir, e))?;
        let path = self.next_path(site, kind);
        fs::write(&path, payload).map_err(|e| LedgerError::io(&path, e))?;
        debug!(site, %kind, path = %path.display(), "media written");
        Ok(path)
    }
}

/// Decodes any supported image format and encodes it as RGB JPEG.
pub fn reencode_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, LedgerError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

impl AssetStore for MediaVault {
    fn save(&self, site: &str, kind: AssetKind, bytes: &[u8]) -> Result<PathBuf, HarvestError> {
        self.write(site, kind, bytes)
            .map_err(|e| e.into_harvest("SaveAsset"))
    }
}
