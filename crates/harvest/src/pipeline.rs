// ABOUTME: Per-site pipeline: load the listing, correlate rows, resolve details, save assets and assemble records.
// ABOUTME: Produces a RunReport with row counts, per-row failures and the record batch in page order.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::assets::{persist_asset, AssetKind, AssetStore};
use crate::config::{Field, SiteConfig};
use crate::correlate::{classify, collect_rows, Classification, ListingRow};
use crate::error::HarvestError;
use crate::extractors::fields::{extract_href, extract_title};
use crate::page::{HtmlPage, PageAccess};
use crate::record::{CanonicalRecord, RecordParts};
use crate::resolve::{resolve_detail, FieldValues};
use crate::retry::RetryPolicy;
use crate::source::{AssetFetcher, DocumentSource};
use crate::store::ExistingIndex;

/// A detail row whose page could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub href: String,
    pub error: String,
}

/// Outcome of one site run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Configuration key of the site.
    pub key: String,
    /// Display name used in records and table names.
    pub site: String,
    pub rows_seen: usize,
    pub discarded: usize,
    pub teasers: usize,
    pub details: usize,
    pub skipped: usize,
    /// Detail rows recorded from listing values only.
    pub degraded: usize,
    pub persisted: bool,
    pub failures: Vec<RowFailure>,
    pub records: Vec<CanonicalRecord>,
}

/// Everything one site run needs, borrowed from the caller.
pub struct SiteRun<'a> {
    pub site: &'a str,
    pub config: &'a SiteConfig,
    pub index: &'a ExistingIndex,
    pub source: &'a dyn DocumentSource,
    /// Asset fetcher and store; `None` skips asset downloads.
    pub assets: Option<(&'a dyn AssetFetcher, &'a dyn AssetStore)>,
    pub asset_timeout: Duration,
    pub fetch_retry: RetryPolicy,
}

impl SiteRun<'_> {
    /// Processes the listing page row by row. A listing that cannot be
    /// loaded aborts the run; detail failures only degrade their row.
    pub async fn harvest(&self) -> Result<RunReport, HarvestError> {
        let mut report = RunReport {
            site: self.site.to_string(),
            ..Default::default()
        };

        let listing_url = self.config.site.as_str();
        let ready: Vec<String> = self
            .config
            .fields
            .home(Field::Element)
            .map(|g| g.queries.queries().to_vec())
            .unwrap_or_default();
        let ready: &[String] = &ready;
        let source = self.source;
        let page = self
            .fetch_retry
            .run("LoadListing", move || source.open(listing_url, ready))
            .await?;

        let rows = collect_rows(&page, &self.config.fields);
        info!(site = self.site, rows = rows.len(), "listing correlated");

        for row in rows.iter() {
            report.rows_seen += 1;
            self.process_row(&page, row, &mut report).await;
        }
        Ok(report)
    }

    async fn process_row(
        &self,
        page: &HtmlPage,
        row: &ListingRow<<HtmlPage as PageAccess>::Node>,
        report: &mut RunReport,
    ) {
        let fields = &self.config.fields;
        let href = match (fields.home(Field::Element), row.get(Field::Element)) {
            (Some(group), Some(node)) => extract_href(page, node, group),
            _ => None,
        };
        let title = fields
            .home(Field::Title)
            .and(row.get(Field::Title))
            .and_then(|node| extract_title(page, node));

        let class = classify(
            href.as_deref(),
            title.as_deref(),
            &self.config.classify,
            self.index,
        );
        debug!(site = self.site, row = row.index, class = class.kind(), href = ?href, "row classified");

        let parts = match class {
            Classification::Discard => {
                report.discarded += 1;
                return;
            }
            Classification::Skip { .. } => {
                report.skipped += 1;
                return;
            }
            Classification::Teaser { href } => {
                report.teasers += 1;
                FieldValues::from_row(page, row, fields).into_parts(href)
            }
            Classification::Detail { href } => {
                report.details += 1;
                let hints = FieldValues::from_row(page, row, fields);
                let resolved =
                    resolve_detail(self.source, &href, hints, fields, &self.fetch_retry).await;
                if let Some(err) = resolved.error {
                    report.degraded += 1;
                    report.failures.push(RowFailure {
                        href: href.clone(),
                        error: err.to_string(),
                    });
                }
                resolved.values.into_parts(href)
            }
        };

        let parts = self.attach_assets(parts).await;
        report.records.push(parts.assemble(self.site));
    }

    async fn attach_assets(&self, mut parts: RecordParts) -> RecordParts {
        let Some((fetcher, store)) = self.assets else {
            return parts;
        };
        if let Some(url) = parts.image_src_url.as_deref() {
            parts.local_image_path =
                persist_asset(fetcher, store, self.site, AssetKind::Image, url, self.asset_timeout)
                    .await;
        }
        if let Some(url) = parts.video_embed_url.as_deref() {
            parts.local_video_path =
                persist_asset(fetcher, store, self.site, AssetKind::Video, url, self.asset_timeout)
                    .await;
        }
        parts
    }
}
