// ABOUTME: The existing-records index used for incremental runs and the record store contract.
// ABOUTME: The index is an immutable snapshot of persisted detail URLs and titles for one site.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::HarvestError;
use crate::record::CanonicalRecord;

/// Previously persisted detail URLs and titles for a site.
///
/// Loaded once at run start and never mutated during the run. Lookups are
/// exact string matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingIndex {
    urls: HashSet<String>,
    titles: HashSet<String>,
}

impl ExistingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        urls: impl IntoIterator<Item = String>,
        titles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            urls: urls.into_iter().collect(),
            titles: titles.into_iter().collect(),
        }
    }

    /// Builds the index from already persisted records, ignoring sentinels.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CanonicalRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            if let Some(url) = CanonicalRecord::resolved(&record.detail_url) {
                index.urls.insert(url.to_string());
            }
            if let Some(title) = CanonicalRecord::resolved(&record.title) {
                index.titles.insert(title.to_string());
            }
        }
        index
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    pub fn title_count(&self) -> usize {
        self.titles.len()
    }
}

/// Persisted record storage.
///
/// `persist_batch` appends and must tolerate being called again with
/// records it already holds.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn existing_records(&self, site: &str) -> Result<ExistingIndex, HarvestError>;

    async fn persist_batch(
        &self,
        records: &[CanonicalRecord],
        site: &str,
    ) -> Result<(), HarvestError>;
}
