// ABOUTME: Integration tests for the sitetrawl CLI binary.
// ABOUTME: Runs against a mocked listing site with a temporary data directory.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn sitetrawl_cmd() -> Command {
    Command::cargo_bin("sitetrawl").unwrap()
}

const LISTING: &str = r#"<html><body>
<div class="card"><a href="/v/1"><span class="t">first scene</span></a><i class="d">Jan 5, 2024</i></div>
<div class="card"><a href="/v/2"><span class="t">second scene</span></a><i class="d">Feb 6, 2024</i></div>
</body></html>"#;

fn write_config(dir: &Path, listing_url: &str) -> std::path::PathBuf {
    let config = format!(
        r#"{{
  "MockTour": {{
    "site": "{listing_url}",
    "fields": {{
      "element": {{ "home": {{ "queries": ["div.card a"] }} }},
      "title": {{ "home": {{ "queries": ["div.card span.t"] }} }},
      "date": {{ "home": {{ "queries": ["div.card i.d"] }} }},
      "description": {{ "inside": {{ "queries": ["p.about"] }} }}
    }}
  }}
}}"#
    );
    let path = dir.join("sites.json");
    fs::write(&path, config).unwrap();
    path
}

fn mock_site(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/videos");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(LISTING);
    });
    server.mock(|when, then| {
        when.method(GET).path("/v/1");
        then.status(200)
            .body("<html><body><p class=\"about\">About the first.</p></body></html>");
    });
    server.mock(|when, then| {
        when.method(GET).path("/v/2");
        then.status(200)
            .body("<html><body><p class=\"about\">About the second.</p></body></html>");
    });
}

fn site_tables(data: &Path) -> Vec<std::path::PathBuf> {
    match fs::read_dir(data.join("Sites")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn list_prints_configured_keys() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "https://tour.mocktour.com/videos");

    sitetrawl_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("mocktour"));
}

#[test]
fn missing_config_fails() {
    let temp = TempDir::new().unwrap();

    sitetrawl_cmd()
        .arg("--config")
        .arg(temp.path().join("nope.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn run_persists_records_and_prints_json() {
    let server = MockServer::start();
    mock_site(&server);
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server.url("/videos"));
    let data = temp.path().join("data");

    let output = sitetrawl_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--data-dir")
        .arg(&data)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let outcomes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let report = &outcomes[0]["report"];
    assert_eq!(outcomes[0]["key"], "mocktour");
    assert_eq!(report["records"].as_array().unwrap().len(), 2);
    assert_eq!(report["records"][0]["Title"], "First Scene");
    assert_eq!(report["records"][0]["Date"], "Jan 05, 2024");
    assert_eq!(report["records"][0]["Description"], "About the first.");
    assert_eq!(report["records"][1]["Path image"], "-");
    assert_eq!(report["persisted"], true);

    let tables = site_tables(&data);
    assert_eq!(tables.len(), 1);
    let table = fs::read_to_string(&tables[0]).unwrap();
    assert!(table.starts_with("Site,Date,Title,Description"));
    assert!(table.contains("About the second."));

    // Second run sees both detail URLs in the table and adds nothing.
    sitetrawl_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--data-dir")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 new, 2 skipped"));
}

#[test]
fn dry_run_leaves_data_dir_untouched() {
    let server = MockServer::start();
    mock_site(&server);
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server.url("/videos"));
    let data = temp.path().join("data");

    sitetrawl_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--data-dir")
        .arg(&data)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 new").and(predicate::str::contains("not persisted")));

    assert!(site_tables(&data).is_empty());
}

#[test]
fn unknown_site_reports_failure() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "https://tour.mocktour.com/videos");

    sitetrawl_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--data-dir")
        .arg(temp.path().join("data"))
        .arg("--site")
        .arg("elsewhere")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("elsewhere: failed"));
}
