// ABOUTME: The Harvester entry point: owns the HTTP client and runs configured sites end to end.
// ABOUTME: Loads the existing-records index, opens the site's source, runs the pipeline and persists the batch.

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::assets::AssetStore;
use crate::config::{SiteConfig, SiteRegistry};
use crate::error::HarvestError;
use crate::normalize::site::site_name;
use crate::options::{HarvesterBuilder, Options};
use crate::pipeline::{RunReport, SiteRun};
use crate::source::{open_source, AssetFetcher, HttpSource};
use crate::store::RecordStore;

/// Runs scrape configurations against live sites.
pub struct Harvester {
    opts: Options,
    http: HttpSource,
}

impl Harvester {
    /// Create a new HarvesterBuilder for configuring the harvester.
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::new()
    }

    /// Create a new Harvester with the given options.
    pub fn new(opts: Options) -> Result<Self, HarvestError> {
        let client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    HarvestError::config("BuildClient", Some(anyhow::Error::new(e)))
                })?,
        };
        let http = HttpSource::new(client).with_headers(&opts.headers);
        Ok(Self { opts, http })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Runs one site: index snapshot, listing, rows, assets, then persistence.
    ///
    /// `assets` is ignored in dry-run mode, and nothing is persisted.
    pub async fn run_site(
        &self,
        key: &str,
        config: &SiteConfig,
        store: &dyn RecordStore,
        assets: Option<&dyn AssetStore>,
    ) -> Result<RunReport, HarvestError> {
        let site = site_name(&config.site);
        info!(site = %site, key, backend = %config.backend, "starting site run");

        let index = store.existing_records(&site).await?;
        info!(
            site = %site,
            urls = index.url_count(),
            titles = index.title_count(),
            "existing records loaded"
        );

        let mut source = open_source(config, &self.http).await?;
        let fetcher = self.http.with_headers(&config.headers);
        let assets = match assets {
            Some(store) if !self.opts.dry_run => Some((&fetcher as &dyn AssetFetcher, store)),
            _ => None,
        };

        let run = SiteRun {
            site: &site,
            config,
            index: &index,
            source: source.as_ref(),
            assets,
            asset_timeout: self.opts.asset_timeout,
            fetch_retry: self.opts.fetch_retry,
        };
        let outcome = run.harvest().await;
        drop(run);
        if let Err(e) = source.close().await {
            warn!(site = %site, error = %e, "closing source failed");
        }

        let mut report = outcome?;
        report.key = key.to_string();

        if !self.opts.dry_run && !report.records.is_empty() {
            let records = report.records.as_slice();
            let site_ref = site.as_str();
            self.opts
                .persist_retry
                .run("PersistBatch", move || store.persist_batch(records, site_ref))
                .await?;
            report.persisted = true;
        }

        info!(
            site = %site,
            rows = report.rows_seen,
            teasers = report.teasers,
            details = report.details,
            skipped = report.skipped,
            discarded = report.discarded,
            degraded = report.degraded,
            records = report.records.len(),
            "site run finished"
        );
        Ok(report)
    }

    /// Runs several sites, at most `concurrency` at a time. Each site gets
    /// its own index snapshot and batch; results come back in completion order.
    pub async fn run_sites(
        &self,
        registry: &SiteRegistry,
        keys: &[String],
        store: &dyn RecordStore,
        assets: Option<&dyn AssetStore>,
        concurrency: usize,
    ) -> Vec<(String, Result<RunReport, HarvestError>)> {
        stream::iter(keys.iter())
            .map(|key| async move {
                let result = match registry.get(key) {
                    Ok(config) => self.run_site(key, config, store, assets).await,
                    Err(e) => Err(HarvestError::config(
                        "LookupSite",
                        Some(anyhow::Error::new(e)),
                    )),
                };
                (key.clone(), result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}
