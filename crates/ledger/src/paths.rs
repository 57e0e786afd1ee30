// ABOUTME: On-disk layout of the data directory: site tables, daily tables and media folders.
// ABOUTME: Also builds timestamp-plus-counter media file names.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use sitetrawl_harvest::AssetKind;

/// Date format used in daily table names, e.g. `Jan 05, 2024`.
pub const DAILY_DATE_FORMAT: &str = "%b %d, %Y";
/// Timestamp prefix of saved media files.
pub const MEDIA_STAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// Paths under a data root.
///
/// ```text
/// <root>/Sites/<Site>.csv
/// <root>/Raw/DailyScraped+<Mon DD, YYYY>.csv
/// <root>/Pictures/<Site>/<stamp>-<n>.jpg
/// <root>/Videos/<Site>/<stamp>-<n>.mp4
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site_table(&self, site: &str) -> PathBuf {
        self.root
            .join("Sites")
            .join(format!("{}.csv", path_safe(site)))
    }

    pub fn daily_table(&self, day: NaiveDate) -> PathBuf {
        self.root
            .join("Raw")
            .join(format!("DailyScraped+{}.csv", day.format(DAILY_DATE_FORMAT)))
    }

    pub fn media_dir(&self, site: &str, kind: AssetKind) -> PathBuf {
        let folder = match kind {
            AssetKind::Image => "Pictures",
            AssetKind::Video => "Videos",
        };
        self.root.join(folder).join(path_safe(site))
    }

    pub fn media_file(
        &self,
        site: &str,
        kind: AssetKind,
        at: NaiveDateTime,
        counter: usize,
    ) -> PathBuf {
        self.media_dir(site, kind)
            .join(media_file_name(at, counter, kind))
    }
}

pub fn media_file_name(at: NaiveDateTime, counter: usize, kind: AssetKind) -> String {
    format!(
        "{}-{}.{}",
        at.format(MEDIA_STAMP_FORMAT),
        counter,
        kind.extension()
    )
}

fn path_safe(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
