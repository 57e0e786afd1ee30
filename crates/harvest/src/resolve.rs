// ABOUTME: Detail-page resolver and per-location field extraction for listing rows and detail pages.
// ABOUTME: Merges detail values over listing hints with a fixed per-field precedence.

//! Detail resolution.
//!
//! A listing row yields "home" values from its aligned cells. Detail rows
//! then load the detail page and extract "inside" values from the whole
//! document. Title and date keep the listing value when present; every
//! other field prefers the detail value and falls back to the listing
//! hint. A detail page that cannot be loaded leaves the hints in place.

use tracing::{debug, warn};

use crate::config::{Field, FieldMap};
use crate::correlate::ListingRow;
use crate::error::HarvestError;
use crate::extractors::fields::{
    extract_date, extract_description, extract_image, extract_models, extract_tags,
    extract_title, extract_video,
};
use crate::extractors::select::select_group;
use crate::normalize::link::is_blob;
use crate::normalize::text::join_list;
use crate::page::PageAccess;
use crate::record::RecordParts;
use crate::retry::RetryPolicy;
use crate::source::DocumentSource;

/// Extracted values for one entry, before assets are saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    pub title: Option<String>,
    pub date: Option<String>,
    pub models: Vec<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Listing-page hints carried into detail resolution.
pub type DetailHints = FieldValues;

impl FieldValues {
    /// Values from a listing row's aligned cells, using each field's `home` group.
    pub fn from_row<P: PageAccess>(page: &P, row: &ListingRow<P::Node>, fields: &FieldMap) -> Self {
        let cell = |field: Field| {
            let group = fields.home(field)?;
            Some((row.get(field)?, group))
        };
        Self {
            title: cell(Field::Title).and_then(|(n, _)| extract_title(page, n)),
            date: cell(Field::Date).and_then(|(n, g)| extract_date(page, n, g)),
            models: cell(Field::Models)
                .map(|(n, g)| extract_models(page, &[n], g))
                .unwrap_or_default(),
            image: cell(Field::Image).and_then(|(n, g)| extract_image(page, n, g)),
            video: cell(Field::Video).and_then(|(n, g)| extract_video(page, n, g)),
            description: cell(Field::Description).and_then(|(n, _)| extract_description(page, n)),
            tags: cell(Field::Tags)
                .map(|(n, g)| extract_tags(page, &[n], g))
                .unwrap_or_default(),
        }
    }

    /// Values from a detail document, using each field's `inside` group.
    ///
    /// Scalar fields read the first node of the winning query; models and
    /// tags read every node.
    pub fn from_detail<P: PageAccess>(page: &P, fields: &FieldMap) -> Self {
        let nodes = |field: Field| {
            let group = fields.inside(field)?;
            let nodes = select_group(page, Some(group));
            if nodes.is_empty() {
                debug!(field = %field, "no detail node");
                None
            } else {
                Some((nodes, group))
            }
        };
        Self {
            title: nodes(Field::Title).and_then(|(n, _)| extract_title(page, n[0])),
            date: nodes(Field::Date).and_then(|(n, g)| extract_date(page, n[0], g)),
            models: nodes(Field::Models)
                .map(|(n, g)| extract_models(page, &n, g))
                .unwrap_or_default(),
            image: nodes(Field::Image).and_then(|(n, g)| extract_image(page, n[0], g)),
            video: nodes(Field::Video).and_then(|(n, g)| extract_video(page, n[0], g)),
            description: nodes(Field::Description).and_then(|(n, _)| extract_description(page, n[0])),
            tags: nodes(Field::Tags)
                .map(|(n, g)| extract_tags(page, &n, g))
                .unwrap_or_default(),
        }
    }

    /// Combines detail values with listing hints.
    pub fn merge(hints: FieldValues, detail: FieldValues) -> FieldValues {
        fn prefer_list(first: Vec<String>, second: Vec<String>) -> Vec<String> {
            if first.is_empty() {
                second
            } else {
                first
            }
        }
        let detail_video = detail.video.filter(|v| !is_blob(v));
        FieldValues {
            title: hints.title.or(detail.title),
            date: hints.date.or(detail.date),
            models: prefer_list(detail.models, hints.models),
            image: detail.image.or(hints.image),
            video: detail_video.or(hints.video),
            description: detail.description.or(hints.description),
            tags: prefer_list(detail.tags, hints.tags),
        }
    }

    /// Record parts for these values; asset paths are filled in later.
    pub fn into_parts(self, detail_url: String) -> RecordParts {
        RecordParts {
            date: self.date,
            title: self.title,
            description: self.description,
            tags: join_list(&self.tags),
            models: join_list(&self.models),
            video_embed_url: self.video,
            detail_url: Some(detail_url),
            image_src_url: self.image,
            local_image_path: None,
            local_video_path: None,
        }
    }
}

/// Outcome of resolving one detail row.
#[derive(Debug)]
pub struct Resolved {
    pub values: FieldValues,
    /// The load failure, if the detail page could not be obtained.
    pub error: Option<HarvestError>,
}

/// Loads the detail page and merges its values over the hints.
///
/// The page load is retried under `retry`. If it still fails the hints are
/// returned unchanged together with the error.
pub async fn resolve_detail(
    source: &dyn DocumentSource,
    href: &str,
    hints: DetailHints,
    fields: &FieldMap,
    retry: &RetryPolicy,
) -> Resolved {
    let ready_queries = fields.inside_queries();
    let ready: &[String] = &ready_queries;
    let loaded = retry
        .run("LoadDetail", move || source.open(href, ready))
        .await;
    match loaded {
        Ok(page) => {
            let detail = FieldValues::from_detail(&page, fields);
            Resolved {
                values: FieldValues::merge(hints, detail),
                error: None,
            }
        }
        Err(e) => {
            warn!(url = href, error = %e, "detail page unavailable, using listing values");
            Resolved {
                values: hints,
                error: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HtmlPage;
    use async_trait::async_trait;
    use std::time::Duration;

    const DETAIL: &str = r#"
        <h1 class="t">detail title</h1>
        <div class="desc">Description: Long text.</div>
        <ul class="tags"><li>outdoor</li><li>drama</li></ul>
        <div class="cast"><a>ann lee</a><a>bo chen</a></div>
        <img class="poster" src="https://cdn.x.com/big.jpg">
        <video><source src="blob:https://x.com/9"></video>
    "#;

    fn fields() -> FieldMap {
        serde_json::from_str(
            r#"{
                "title": {"inside": {"queries": ["h1.t"]}},
                "description": {"inside": {"queries": ["div.desc"]}},
                "tags": {"inside": {"queries": ["ul.tags li"]}},
                "models": {"inside": {"queries": ["div.cast"], "sub_query": "a"}},
                "image": {"inside": {"queries": ["img.poster"]}},
                "video": {"inside": {"queries": ["video"], "sub_query": "source"}}
            }"#,
        )
        .unwrap()
    }

    struct StaticDoc(Option<&'static str>);

    #[async_trait(?Send)]
    impl DocumentSource for StaticDoc {
        async fn open(&self, url: &str, _ready: &[String]) -> Result<HtmlPage, HarvestError> {
            match self.0 {
                Some(body) => Ok(HtmlPage::parse(None, body)),
                None => Err(HarvestError::status(url, "FetchDocument", 500)),
            }
        }
    }

    fn hints() -> DetailHints {
        FieldValues {
            title: Some("Listing Title".into()),
            models: vec!["Hint Model".into()],
            image: Some("https://cdn.x.com/small.jpg".into()),
            video: Some("https://cdn.x.com/t.mp4".into()),
            ..Default::default()
        }
    }

    #[test]
    fn detail_values_extracted() {
        let page = HtmlPage::parse(None, DETAIL);
        let values = FieldValues::from_detail(&page, &fields());
        assert_eq!(values.title.as_deref(), Some("Detail Title"));
        assert_eq!(values.description.as_deref(), Some("Long text."));
        assert_eq!(values.tags, vec!["Outdoor", "Drama"]);
        assert_eq!(values.models, vec!["Ann Lee", "Bo Chen"]);
        assert_eq!(values.video.as_deref(), Some("blob:https://x.com/9"));
    }

    #[test]
    fn merge_precedence() {
        let page = HtmlPage::parse(None, DETAIL);
        let merged = FieldValues::merge(hints(), FieldValues::from_detail(&page, &fields()));
        assert_eq!(merged.title.as_deref(), Some("Listing Title"));
        assert_eq!(merged.models, vec!["Ann Lee", "Bo Chen"]);
        assert_eq!(merged.image.as_deref(), Some("https://cdn.x.com/big.jpg"));
        assert_eq!(merged.video.as_deref(), Some("https://cdn.x.com/t.mp4"));
    }

    #[tokio::test]
    async fn failed_detail_keeps_hints_and_reports() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let resolved =
            resolve_detail(&StaticDoc(None), "https://x.com/v/1", hints(), &fields(), &policy).await;
        assert_eq!(resolved.values, hints());
        assert!(resolved.error.unwrap().is_status());
    }

    #[tokio::test]
    async fn detail_into_parts_joins_lists() {
        let policy = RetryPolicy::none();
        let resolved = resolve_detail(
            &StaticDoc(Some(DETAIL)),
            "https://x.com/v/1",
            hints(),
            &fields(),
            &policy,
        )
        .await;
        assert!(resolved.error.is_none());
        let parts = resolved.values.into_parts("https://x.com/v/1".into());
        assert_eq!(parts.tags.as_deref(), Some("Outdoor, Drama"));
        assert_eq!(parts.models.as_deref(), Some("Ann Lee, Bo Chen"));
        assert_eq!(parts.detail_url.as_deref(), Some("https://x.com/v/1"));
    }
}
