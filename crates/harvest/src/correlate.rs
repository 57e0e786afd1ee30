// ABOUTME: Listing correlator: collects per-field node streams, aligns them by index and classifies rows.
// ABOUTME: Rows are padded to the longest stream so every detected entry gets a classification.

//! Listing correlation.
//!
//! Each field's `home` group is queried independently against the listing
//! page. The resulting streams can differ in length because sites do not
//! mark up every field for every entry, so rows are aligned by position and
//! a missing node is an explicit `None` cell rather than a truncated row.

use crate::config::{ClassifyRules, Field, FieldMap};
use crate::extractors::select::select_group;
use crate::normalize::link::strip_query;
use crate::page::PageAccess;
use crate::store::ExistingIndex;

/// Number of listing columns.
pub const FIELD_COUNT: usize = Field::ALL.len();

/// One aligned listing entry: an optional node per field column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow<N> {
    pub index: usize,
    cells: [Option<N>; FIELD_COUNT],
}

impl<N: Copy> ListingRow<N> {
    pub fn get(&self, field: Field) -> Option<N> {
        self.cells[field.index()]
    }

    /// Returns true when no column has a node at this position.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// The aligned rows of one listing page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRows<N> {
    rows: Vec<ListingRow<N>>,
}

impl<N: Copy> AlignedRows<N> {
    /// Zips the streams by index, padding shorter ones with `None`.
    pub fn align(streams: [Vec<N>; FIELD_COUNT]) -> Self {
        let len = streams.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..len)
            .map(|index| ListingRow {
                index,
                cells: std::array::from_fn(|col| streams[col].get(index).copied()),
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListingRow<N>> {
        self.rows.iter()
    }
}

/// Runs every field's `home` group against the listing page and aligns the results.
pub fn collect_rows<P: PageAccess>(page: &P, fields: &FieldMap) -> AlignedRows<P::Node> {
    let streams: [Vec<P::Node>; FIELD_COUNT] =
        std::array::from_fn(|col| select_group(page, fields.home(Field::ALL[col])));
    AlignedRows::align(streams)
}

/// What to do with a listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not a content entry (no link, or a subscription funnel link).
    Discard,
    /// Fully described on the listing page.
    Teaser { href: String },
    /// Needs a detail page visit.
    Detail { href: String },
    /// Already persisted.
    Skip { href: String },
}

impl Classification {
    pub fn kind(&self) -> &'static str {
        match self {
            Classification::Discard => "discard",
            Classification::Teaser { .. } => "teaser",
            Classification::Detail { .. } => "detail",
            Classification::Skip { .. } => "skip",
        }
    }
}

/// Classifies a row by its href and title.
///
/// The subscription prefix is checked on the raw href; the query string is
/// then dropped before the join-suffix and index checks. A join-suffix row
/// whose title is already known falls through to the URL check.
pub fn classify(
    href: Option<&str>,
    title: Option<&str>,
    rules: &ClassifyRules,
    index: &ExistingIndex,
) -> Classification {
    let Some(raw) = href.map(str::trim).filter(|h| !h.is_empty()) else {
        return Classification::Discard;
    };
    if !rules.subscribe_prefix.is_empty() && raw.starts_with(&rules.subscribe_prefix) {
        return Classification::Discard;
    }

    let href = strip_query(raw).to_string();
    let title_known = title.map(|t| index.contains_title(t)).unwrap_or(false);
    if !rules.join_suffix.is_empty() && href.ends_with(&rules.join_suffix) && !title_known {
        return Classification::Teaser { href };
    }
    if index.contains_url(&href) {
        Classification::Skip { href }
    } else {
        Classification::Detail { href }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocationGroup, QueryList};
    use crate::page::HtmlPage;

    fn rules() -> ClassifyRules {
        ClassifyRules::default()
    }

    fn index() -> ExistingIndex {
        ExistingIndex::from_parts(
            vec!["https://x.com/v/seen".to_string()],
            vec!["Old Title".to_string()],
        )
    }

    #[test]
    fn subscription_prefix_is_discarded() {
        assert_eq!(
            classify(Some("https://join.example.com/x"), None, &rules(), &index()),
            Classification::Discard
        );
    }

    #[test]
    fn missing_href_is_discarded() {
        assert_eq!(classify(None, Some("T"), &rules(), &index()), Classification::Discard);
        assert_eq!(classify(Some("  "), None, &rules(), &index()), Classification::Discard);
    }

    #[test]
    fn join_suffix_after_query_strip_is_teaser() {
        assert_eq!(
            classify(Some("https://x.com/join?ref=1"), Some("New"), &rules(), &index()),
            Classification::Teaser {
                href: "https://x.com/join".to_string()
            }
        );
    }

    #[test]
    fn join_suffix_with_known_title_falls_through() {
        assert_eq!(
            classify(Some("https://x.com/join"), Some("Old Title"), &rules(), &index()),
            Classification::Detail {
                href: "https://x.com/join".to_string()
            }
        );
    }

    #[test]
    fn known_url_is_skipped() {
        assert_eq!(
            classify(Some("https://x.com/v/seen?utm=1"), None, &rules(), &index()),
            Classification::Skip {
                href: "https://x.com/v/seen".to_string()
            }
        );
    }

    #[test]
    fn unknown_url_is_detail() {
        assert_eq!(
            classify(Some("https://x.com/v/new"), None, &rules(), &index()),
            Classification::Detail {
                href: "https://x.com/v/new".to_string()
            }
        );
    }

    #[test]
    fn every_href_gets_exactly_one_class() {
        let hrefs = [
            None,
            Some("https://join.x.com"),
            Some("https://x.com/join"),
            Some("https://x.com/v/seen"),
            Some("https://x.com/v/other"),
            Some("/relative"),
        ];
        for href in hrefs {
            let class = classify(href, None, &rules(), &index());
            if let Classification::Skip { href } = &class {
                assert!(index().contains_url(href));
            }
        }
    }

    #[test]
    fn align_pads_to_longest_stream() {
        let mut streams: [Vec<u32>; FIELD_COUNT] = Default::default();
        streams[Field::Element.index()] = vec![1, 2, 3];
        streams[Field::Title.index()] = vec![10];
        streams[Field::Image.index()] = vec![20, 21, 22, 23];
        let rows = AlignedRows::align(streams);
        assert_eq!(rows.len(), 4);
        let rows: Vec<_> = rows.iter().collect();
        assert_eq!(rows[0].get(Field::Title), Some(10));
        assert_eq!(rows[1].get(Field::Title), None);
        assert_eq!(rows[2].get(Field::Element), Some(3));
        assert_eq!(rows[3].get(Field::Element), None);
        assert_eq!(rows[3].get(Field::Image), Some(23));
        assert!(!rows[3].is_blank());
    }

    #[test]
    fn collect_rows_from_listing() {
        let html = r#"
            <div class="s"><a href="/v/1">a</a><h3>One</h3></div>
            <div class="s"><a href="/v/2">b</a></div>
            <div class="s"><a href="/v/3">c</a><h3>Three</h3></div>
        "#;
        let page = HtmlPage::parse(None, html);
        let group = |q: &str| LocationGroup {
            queries: QueryList::Queries(vec![q.to_string()]),
            ..Default::default()
        };
        let fields: FieldMap = FieldMap {
            element: Some(crate::config::FieldConfig {
                home: Some(group("div.s a")),
                inside: None,
            }),
            title: Some(crate::config::FieldConfig {
                home: Some(group("div.s h3")),
                inside: None,
            }),
            ..Default::default()
        };
        let rows = collect_rows(&page, &fields);
        assert_eq!(rows.len(), 3);
        let last = rows.iter().last().unwrap();
        assert!(last.get(Field::Element).is_some());
        assert!(last.get(Field::Title).is_none());
    }
}
