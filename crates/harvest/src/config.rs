// ABOUTME: Typed per-site scrape configuration and the registry that loads it from JSON.
// ABOUTME: Query lists, location groups, field maps, classification rules and load-time validation.

//! Scrape configuration.
//!
//! The configuration document is a JSON object keyed by site identifier.
//! Each entry names the listing URL, the backend used to load it, and for
//! every field the `home` (listing page) and `inside` (detail page)
//! location groups. Everything is parsed once and validated up front:
//! every selector must compile and every listing URL must parse.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::extractors::compiled::precompile_selectors;
use crate::normalize::link::LinkRewrite;

/// Errors raised while loading or querying the configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("site {site}: invalid selector {selector:?}")]
    InvalidSelector { site: String, selector: String },
    #[error("site {site}: invalid listing url {url:?}")]
    InvalidListingUrl { site: String, url: String },
    #[error("site {site}: invalid request header {header:?}")]
    InvalidHeader { site: String, header: String },
    #[error("unknown site {0:?}")]
    UnknownSite(String),
}

/// An ordered list of query expressions.
///
/// The three states are distinct: no entries at all, an explicit empty
/// entry meaning "intentionally unset", and real queries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum QueryList {
    #[default]
    Empty,
    Placeholder,
    Queries(Vec<String>),
}

impl From<Vec<String>> for QueryList {
    fn from(raw: Vec<String>) -> Self {
        if raw.is_empty() {
            QueryList::Empty
        } else if raw.iter().any(|q| q.trim().is_empty()) {
            QueryList::Placeholder
        } else {
            QueryList::Queries(raw)
        }
    }
}

impl From<QueryList> for Vec<String> {
    fn from(list: QueryList) -> Self {
        match list {
            QueryList::Empty => Vec::new(),
            QueryList::Placeholder => vec![String::new()],
            QueryList::Queries(q) => q,
        }
    }
}

impl QueryList {
    /// The queries to try, in order. Empty for the unset states.
    pub fn queries(&self) -> &[String] {
        match self {
            QueryList::Queries(q) => q,
            _ => &[],
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, QueryList::Queries(_))
    }
}

/// Where to find one field on one kind of page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationGroup {
    /// Selectors tried in order; the first with a match wins.
    #[serde(default)]
    pub queries: QueryList,
    /// Attribute to read instead of text content.
    #[serde(default)]
    pub attribute: Option<String>,
    /// Selector run inside each matched node (model names, video source element).
    #[serde(default)]
    pub sub_query: Option<String>,
    #[serde(default)]
    pub rewrites: Vec<LinkRewrite>,
    /// Explicit strftime-style format for date fields.
    #[serde(default)]
    pub date_format: Option<String>,
}

impl LocationGroup {
    /// Returns true when the group can produce a value at all.
    pub fn is_active(&self) -> bool {
        self.queries.is_active()
    }

    fn selectors(&self) -> impl Iterator<Item = &str> {
        self.queries
            .queries()
            .iter()
            .map(String::as_str)
            .chain(self.sub_query.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// The two location groups for a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub home: Option<LocationGroup>,
    #[serde(default)]
    pub inside: Option<LocationGroup>,
}

/// The listing-page field columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The href-bearing entry element.
    Element,
    Title,
    Date,
    Models,
    Image,
    Video,
    Description,
    Tags,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Element,
        Field::Title,
        Field::Date,
        Field::Models,
        Field::Image,
        Field::Video,
        Field::Description,
        Field::Tags,
    ];

    /// Column position inside a listing row.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Element => "element",
            Field::Title => "title",
            Field::Date => "date",
            Field::Models => "models",
            Field::Image => "image",
            Field::Video => "video",
            Field::Description => "description",
            Field::Tags => "tags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-field configuration, one optional entry per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default)]
    pub element: Option<FieldConfig>,
    #[serde(default)]
    pub title: Option<FieldConfig>,
    #[serde(default)]
    pub date: Option<FieldConfig>,
    #[serde(default)]
    pub models: Option<FieldConfig>,
    #[serde(default)]
    pub image: Option<FieldConfig>,
    #[serde(default)]
    pub video: Option<FieldConfig>,
    #[serde(default)]
    pub description: Option<FieldConfig>,
    #[serde(default)]
    pub tags: Option<FieldConfig>,
}

impl FieldMap {
    pub fn get(&self, field: Field) -> Option<&FieldConfig> {
        match field {
            Field::Element => self.element.as_ref(),
            Field::Title => self.title.as_ref(),
            Field::Date => self.date.as_ref(),
            Field::Models => self.models.as_ref(),
            Field::Image => self.image.as_ref(),
            Field::Video => self.video.as_ref(),
            Field::Description => self.description.as_ref(),
            Field::Tags => self.tags.as_ref(),
        }
    }

    /// The listing-page group for a field, if configured and active.
    pub fn home(&self, field: Field) -> Option<&LocationGroup> {
        self.get(field)
            .and_then(|c| c.home.as_ref())
            .filter(|g| g.is_active())
    }

    /// The detail-page group for a field, if configured and active.
    pub fn inside(&self, field: Field) -> Option<&LocationGroup> {
        self.get(field)
            .and_then(|c| c.inside.as_ref())
            .filter(|g| g.is_active())
    }

    fn groups(&self) -> impl Iterator<Item = &LocationGroup> {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.get(f))
            .flat_map(|c| c.home.iter().chain(c.inside.iter()))
    }

    /// Every selector used by any group that waits on the detail page.
    pub fn inside_queries(&self) -> Vec<String> {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.inside(f))
            .flat_map(|g| g.queries.queries().iter().cloned())
            .collect()
    }
}

fn default_join_suffix() -> String {
    ".com/join".to_string()
}

fn default_subscribe_prefix() -> String {
    "https://join.".to_string()
}

/// Href markers used to classify listing rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRules {
    #[serde(default = "default_join_suffix")]
    pub join_suffix: String,
    #[serde(default = "default_subscribe_prefix")]
    pub subscribe_prefix: String,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        Self {
            join_suffix: default_join_suffix(),
            subscribe_prefix: default_subscribe_prefix(),
        }
    }
}

/// How pages for a site are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Plain HTTP fetch and parse.
    #[default]
    Static,
    /// Rendered by a browser before extraction.
    Interactive,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Backend::Static => "static",
            Backend::Interactive => "interactive",
        };
        write!(f, "{}", s)
    }
}

fn default_true() -> bool {
    true
}

fn default_wait_timeout_secs() -> u64 {
    20
}

/// Configuration for a single site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Listing page URL.
    pub site: String,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(flatten)]
    pub classify: ClassifyRules,
    /// Upper bound on waiting for rendered nodes (interactive backend).
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub fields: FieldMap,
}

impl SiteConfig {
    /// Creates a static-backend config with default rules and no fields.
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            backend: Backend::Static,
            headless: true,
            classify: ClassifyRules::default(),
            wait_timeout_secs: default_wait_timeout_secs(),
            headers: HashMap::new(),
            fields: FieldMap::default(),
        }
    }

    pub fn listing_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.site)
    }

    /// Checks that the listing URL parses and every selector compiles.
    pub fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if self.listing_url().is_err() {
            return Err(ConfigError::InvalidListingUrl {
                site: key.to_string(),
                url: self.site.clone(),
            });
        }
        let bad_header = self.headers.iter().find(|(name, value)| {
            HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err()
        });
        if let Some((name, _)) = bad_header {
            return Err(ConfigError::InvalidHeader {
                site: key.to_string(),
                header: name.clone(),
            });
        }
        let failed = precompile_selectors(self.fields.groups().flat_map(|g| g.selectors()));
        if let Some(selector) = failed.into_iter().next() {
            return Err(ConfigError::InvalidSelector {
                site: key.to_string(),
                selector,
            });
        }
        Ok(())
    }
}

/// All configured sites, keyed by lower-cased identifier.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: HashMap<String, SiteConfig>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, SiteConfig> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (key, config) in raw {
            registry.register(&key, config)?;
        }
        Ok(registry)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Validates and adds a site.
    pub fn register(&mut self, key: &str, config: SiteConfig) -> Result<(), ConfigError> {
        config.validate(key)?;
        self.sites.insert(key.to_lowercase(), config);
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Result<&SiteConfig, ConfigError> {
        self.sites
            .get(&key.to_lowercase())
            .ok_or_else(|| ConfigError::UnknownSite(key.to_string()))
    }

    /// Site keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.sites.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
