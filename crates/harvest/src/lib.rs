// ABOUTME: Main library entry point for the sitetrawl media listing harvester.
// ABOUTME: Re-exports the public API: Harvester, HarvesterBuilder, SiteRegistry, CanonicalRecord, RunReport and the collaborator traits.

//! sitetrawl-harvest - config-driven extraction and deduplication of media listings.
//!
//! A site is described by a JSON configuration: the listing URL and, for
//! every field, where to find it on the listing page (`home`) and on the
//! detail page (`inside`). A run loads the listing, aligns the per-field
//! node streams into rows, classifies each row against the records already
//! stored for the site, visits detail pages where needed and assembles one
//! eleven-column record per new entry.
//!
//! # Example
//!
//! ```no_run
//! use sitetrawl_harvest::{Harvester, RecordStore, SiteRegistry};
//!
//! async fn run(store: &dyn RecordStore) -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SiteRegistry::from_path("sites.json")?;
//!     let harvester = Harvester::builder().build()?;
//!     let config = registry.get("exampletour")?;
//!     let report = harvester.run_site("exampletour", config, store, None).await?;
//!     println!("{} new records", report.records.len());
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod config;
pub mod correlate;
pub mod error;
pub mod extractors;
pub mod harvester;
pub mod normalize;
pub mod options;
pub mod page;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod retry;
pub mod source;
pub mod store;

pub use crate::assets::{AssetKind, AssetStore};
pub use crate::config::{
    Backend, ClassifyRules, ConfigError, Field, FieldConfig, FieldMap, LocationGroup, QueryList,
    SiteConfig, SiteRegistry,
};
pub use crate::correlate::{classify, AlignedRows, Classification, ListingRow};
pub use crate::error::{ErrorCode, HarvestError};
pub use crate::harvester::Harvester;
pub use crate::normalize::{normalize_date, site_name, LinkRewrite};
pub use crate::options::{HarvesterBuilder, Options};
pub use crate::page::{HtmlPage, PageAccess, Scope};
pub use crate::pipeline::{RowFailure, RunReport, SiteRun};
pub use crate::record::{CanonicalRecord, RecordParts, COLUMNS, SENTINEL};
pub use crate::retry::RetryPolicy;
pub use crate::source::{AssetFetcher, DocumentSource, HttpSource};
pub use crate::store::{ExistingIndex, RecordStore};
