// ABOUTME: The canonical eleven-column record and the assembler that fills unresolved fields with a sentinel.
// ABOUTME: Column names match the persisted table headers.

use serde::{Deserialize, Serialize};

/// Placeholder for any field that could not be resolved.
pub const SENTINEL: &str = "-";

/// Table headers, in column order.
pub const COLUMNS: [&str; 11] = [
    "Site",
    "Date",
    "Title",
    "Description",
    "Tags",
    "Models",
    "Video to embed",
    "Link for video",
    "Link for image",
    "Path image",
    "Path video",
];

/// One persisted row. Every field holds a value or [`SENTINEL`], never an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Models")]
    pub models: String,
    #[serde(rename = "Video to embed")]
    pub video_embed_url: String,
    #[serde(rename = "Link for video")]
    pub detail_url: String,
    #[serde(rename = "Link for image")]
    pub image_src_url: String,
    #[serde(rename = "Path image")]
    pub local_image_path: String,
    #[serde(rename = "Path video")]
    pub local_video_path: String,
}

impl CanonicalRecord {
    /// Field values in column order.
    pub fn to_row(&self) -> [String; 11] {
        [
            self.site.clone(),
            self.date.clone(),
            self.title.clone(),
            self.description.clone(),
            self.tags.clone(),
            self.models.clone(),
            self.video_embed_url.clone(),
            self.detail_url.clone(),
            self.image_src_url.clone(),
            self.local_image_path.clone(),
            self.local_video_path.clone(),
        ]
    }

    /// The value if it is not the sentinel.
    pub fn resolved(value: &str) -> Option<&str> {
        if value == SENTINEL || value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Field values gathered for one row before assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordParts {
    pub date: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub models: Option<String>,
    pub video_embed_url: Option<String>,
    pub detail_url: Option<String>,
    pub image_src_url: Option<String>,
    pub local_image_path: Option<String>,
    pub local_video_path: Option<String>,
}

fn cell(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| SENTINEL.to_string())
}

impl RecordParts {
    /// Builds the full-width record for `site`.
    pub fn assemble(self, site: &str) -> CanonicalRecord {
        CanonicalRecord {
            site: cell(Some(site.to_string())),
            date: cell(self.date),
            title: cell(self.title),
            description: cell(self.description),
            tags: cell(self.tags),
            models: cell(self.models),
            video_embed_url: cell(self.video_embed_url),
            detail_url: cell(self.detail_url),
            image_src_url: cell(self.image_src_url),
            local_image_path: cell(self.local_image_path),
            local_video_path: cell(self.local_video_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_all_sentinel_except_site() {
        let record = RecordParts::default().assemble("Example");
        let row = record.to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "Example");
        assert!(row[1..].iter().all(|v| v == SENTINEL));
    }

    #[test]
    fn blank_values_become_sentinel() {
        let record = RecordParts {
            title: Some("  ".into()),
            date: Some("Jan 08, 2020".into()),
            ..Default::default()
        }
        .assemble("");
        assert_eq!(record.site, SENTINEL);
        assert_eq!(record.title, SENTINEL);
        assert_eq!(record.date, "Jan 08, 2020");
    }

    #[test]
    fn serialized_names_match_columns() {
        let record = RecordParts::default().assemble("Example");
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        for column in COLUMNS {
            assert!(obj.contains_key(column), "missing column {column}");
        }
        assert_eq!(obj.len(), COLUMNS.len());
    }

    #[test]
    fn resolved_hides_sentinel() {
        assert_eq!(CanonicalRecord::resolved(SENTINEL), None);
        assert_eq!(CanonicalRecord::resolved("x"), Some("x"));
    }
}
