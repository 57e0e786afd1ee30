// ABOUTME: CSV-backed record store: a table per site plus a table per scrape day.
// ABOUTME: Appends are serialized, skip rows already present, and feed the existing-records index.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use csv::StringRecord;
use sitetrawl_harvest::{CanonicalRecord, ExistingIndex, HarvestError, RecordStore, COLUMNS};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::paths::DataLayout;

const URL_COLUMN: &str = "Link for video";
const TITLE_COLUMN: &str = "Title";

/// Record store writing the canonical columns to CSV files under a [`DataLayout`].
#[derive(Debug)]
pub struct CsvLedger {
    layout: DataLayout,
    write_lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            write_lock: Mutex::new(()),
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// All records of a site table. A missing table is empty.
    pub fn site_records(&self, site: &str) -> Result<Vec<CanonicalRecord>, LedgerError> {
        read_records(&self.layout.site_table(site))
    }
}

/// Reads every record of a table written with the canonical headers.
pub fn read_records(path: &Path) -> Result<Vec<CanonicalRecord>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| LedgerError::csv(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<CanonicalRecord>, _>>()
        .map_err(|e| LedgerError::csv(path, e))
}

/// Reads the header and the (detail URL, title) cell pair of every row.
///
/// Columns are located by header name, so tables with extra, missing or
/// reordered columns still load. Returns `None` for a missing or empty table.
fn scan_keys(
    path: &Path,
    mut visit: impl FnMut(&str, &str),
) -> Result<Option<StringRecord>, LedgerError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| LedgerError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| LedgerError::csv(path, e))?
        .clone();
    if headers.is_empty() {
        return Ok(None);
    }
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let url_col = column(URL_COLUMN);
    let title_col = column(TITLE_COLUMN);

    for row in reader.records() {
        let row = row.map_err(|e| LedgerError::csv(path, e))?;
        let cell = |col: Option<usize>| col.and_then(|i| row.get(i)).map(str::trim).unwrap_or("");
        visit(cell(url_col), cell(title_col));
    }
    Ok(Some(headers))
}

/// Builds the index from a table's detail URL and title columns. Other
/// columns are ignored, so older tables with extra columns still load.
pub fn load_index(path: &Path) -> Result<ExistingIndex, LedgerError> {
    let mut urls = Vec::new();
    let mut titles = Vec::new();
    let resolved = |v: &str| CanonicalRecord::resolved(v).map(str::to_string);
    scan_keys(path, |url, title| {
        urls.extend(resolved(url));
        titles.extend(resolved(title));
    })?;
    Ok(ExistingIndex::from_parts(urls, titles))
}

/// Lays a record out in the column order of `header`. Columns the record
/// does not know are left blank.
fn project(record: &CanonicalRecord, header: &StringRecord) -> Vec<String> {
    let row = record.to_row();
    header
        .iter()
        .map(|name| {
            COLUMNS
                .iter()
                .position(|c| *c == name.trim())
                .map(|i| row[i].clone())
                .unwrap_or_default()
        })
        .collect()
}

/// Appends the records not already in the table and returns how many were written.
///
/// A row is already present when both its detail URL and title match an
/// existing row. A new or empty table gets the canonical header; an existing
/// table keeps its own header and rows are written in its column order.
pub fn append_records(path: &Path, records: &[CanonicalRecord]) -> Result<usize, LedgerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
    }

    let mut present: HashSet<(String, String)> = HashSet::new();
    let existing = scan_keys(path, |url, title| {
        present.insert((url.to_string(), title.to_string()));
    })?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LedgerError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    let header = match existing {
        Some(header) => {
            let missing: Vec<&str> = COLUMNS
                .iter()
                .copied()
                .filter(|c| !header.iter().any(|h| h.trim() == *c))
                .collect();
            if !missing.is_empty() {
                warn!(path = %path.display(), ?missing, "table lacks columns; values dropped");
            }
            header
        }
        None => {
            let header = StringRecord::from(COLUMNS.to_vec());
            writer
                .write_record(&header)
                .map_err(|e| LedgerError::csv(path, e))?;
            header
        }
    };

    let mut written = 0;
    for record in records {
        let key = (record.detail_url.clone(), record.title.clone());
        if !present.insert(key) {
            debug!(path = %path.display(), url = %record.detail_url, "row already present");
            continue;
        }
        writer
            .write_record(project(record, &header))
            .map_err(|e| LedgerError::csv(path, e))?;
        written += 1;
    }
    writer.flush().map_err(|e| LedgerError::io(path, e))?;
    Ok(written)
}

#[async_trait]
impl RecordStore for CsvLedger {
    async fn existing_records(&self, site: &str) -> Result<ExistingIndex, HarvestError> {
        let path = self.layout.site_table(site);
        tokio::task::spawn_blocking(move || load_index(&path))
            .await
            .map_err(LedgerError::from)
            .and_then(|r| r)
            .map_err(|e| e.into_harvest("LoadIndex"))
    }

    async fn persist_batch(
        &self,
        records: &[CanonicalRecord],
        site: &str,
    ) -> Result<(), HarvestError> {
        let _guard = self.write_lock.lock().await;
        let tables: Vec<PathBuf> = vec![
            self.layout.site_table(site),
            self.layout.daily_table(Local::now().date_naive()),
        ];
        let batch = records.to_vec();
        let site_name = site.to_string();

        tokio::task::spawn_blocking(move || {
            for table in &tables {
                let written = append_records(table, &batch)?;
                info!(
                    site = %site_name,
                    table = %table.display(),
                    written,
                    "records appended"
                );
            }
            Ok::<_, LedgerError>(())
        })
        .await
        .map_err(LedgerError::from)
        .and_then(|r| r)
        .map_err(|e| e.into_harvest("PersistBatch"))
    }
}
