//! Integration tests driving the docdex binary against a small documentation
//! tree: build an index, then query and inspect it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

static FIXTURE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get or create the fixture directory with a built index (singleton)
fn get_fixture_dir() -> PathBuf {
    FIXTURE_DIR.get_or_init(create_fixture_dir).clone()
}

fn fixture_root() -> PathBuf {
    std::env::temp_dir()
        .join("docdex_test_fixtures")
        .join(format!("test_{}", std::process::id()))
}

/// Empty config so a user's own config file never leaks into the tests
fn default_config() -> PathBuf {
    fixture_root().join("default-config.json")
}

fn create_fixture_dir() -> PathBuf {
    let dir = fixture_root();

    let _ = fs::remove_dir_all(&dir);
    let docs = dir.join("docs");
    fs::create_dir_all(docs.join("tutorials")).expect("Failed to create fixture dir");
    fs::write(default_config(), "{}").unwrap();

    fs::write(
        docs.join("index.md"),
        "# Welcome\n\nThese tutorials cover bifacial_radiance.\n\n## Installation\n\nUse pip to install the package.\n",
    )
    .unwrap();

    fs::write(
        docs.join("tutorials/weather.ipynb"),
        r##"{
  "cells": [
    {"cell_type": "markdown", "source": ["# Weather data\n", "\n", "Download NSRDB weather files."]},
    {"cell_type": "code", "source": "import bifacial_radiance",
     "outputs": [{"output_type": "stream", "name": "stdout", "text": ["loaded\n"]}]}
  ]
}"##,
    )
    .unwrap();

    fs::write(
        docs.join("tutorials/arrays.md"),
        "# Array simulations\n\nModel a row of bifacial modules.\n",
    )
    .unwrap();

    let out = docdex(&["build", "-q"], &[docs.as_path(), Path::new("-o"), dir.join("searchindex.js").as_path()]);
    assert!(out.status.success(), "build failed: {}", stderr(&out));

    dir
}

fn index_path() -> PathBuf {
    get_fixture_dir().join("searchindex.js")
}

/// Run docdex with string args followed by path args
fn docdex(args: &[&str], paths: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docdex"))
        .arg("--config")
        .arg(default_config())
        .args(args)
        .args(paths)
        .env("DOCDEX_LOG", "off")
        .output()
        .expect("Failed to run docdex")
}

fn search(query: &[&str], extra: &[&str]) -> Output {
    let index = index_path();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docdex"));
    if !extra.contains(&"--config") {
        cmd.arg("--config").arg(default_config());
    }
    cmd.arg("search").arg(&index).args(extra).arg("--").args(query);
    cmd.env("DOCDEX_LOG", "off").output().expect("Failed to run docdex")
}

fn search_json(query: &[&str], extra: &[&str]) -> Vec<serde_json::Value> {
    let mut flags = vec!["--json"];
    flags.extend_from_slice(extra);
    let out = search(query, &flags);
    assert!(out.status.success(), "search failed: {}", stderr(&out));
    serde_json::from_slice::<serde_json::Value>(&out.stdout)
        .expect("search output is JSON")
        .as_array()
        .cloned()
        .expect("search output is an array")
}

fn docnames(hits: &[serde_json::Value]) -> Vec<String> {
    hits.iter()
        .map(|h| h["docname"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_build_writes_set_index_call() {
    let content = fs::read_to_string(index_path()).unwrap();
    assert!(content.starts_with("Search.setIndex("));
    assert!(content.trim_end().ends_with(')'));
}

#[test]
fn test_search_title_ranks_first() {
    let hits = search_json(&["weather"], &[]);
    assert!(!hits.is_empty());
    assert_eq!(hits[0]["docname"], "tutorials/weather");
    assert_eq!(hits[0]["filename"], "tutorials/weather.ipynb");
}

#[test]
fn test_search_results_are_sorted_by_score() {
    let hits = search_json(&["bifacial"], &["--any"]);
    let scores: Vec<i64> = hits.iter().map(|h| h["score"].as_i64().unwrap()).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(scores, sorted);
}

#[test]
fn test_search_excluded_word() {
    let hits = search_json(&["bifacial_radiance", "-weather"], &[]);
    let names = docnames(&hits);
    assert!(names.contains(&"index".to_string()));
    assert!(!names.contains(&"tutorials/weather".to_string()));
}

#[test]
fn test_all_and_any_modes() {
    let all = search_json(&["weather", "simulations"], &[]);
    assert!(all.is_empty());

    let any = search_json(&["weather", "simulations"], &["--any"]);
    let names = docnames(&any);
    assert!(names.contains(&"tutorials/weather".to_string()));
    assert!(names.contains(&"tutorials/arrays".to_string()));
}

#[test]
fn test_search_limit() {
    let hits = search_json(&["weather", "simulations"], &["--any", "--limit", "1"]);
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_unknown_word_has_no_results() {
    assert!(search_json(&["zeppelin"], &[]).is_empty());

    let out = search(&["zeppelin"], &["--color", "never"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "No results.");
}

#[test]
fn test_human_output_with_summary() {
    let docs = get_fixture_dir().join("docs");
    let docs = docs.to_string_lossy().into_owned();
    let out = search(&["nsrdb"], &["--color", "never", "--source", &docs]);
    assert!(out.status.success(), "search failed: {}", stderr(&out));

    let text = stdout(&out);
    assert!(text.contains("1. Weather data"));
    assert!(text.contains("tutorials/weather.html"));
    assert!(text.contains("Download NSRDB weather files."));
}

#[test]
fn test_config_file_limit() {
    let config = get_fixture_dir().join("config.json");
    fs::write(&config, r#"{"limit": 1, "match_mode": "any"}"#).unwrap();
    let config = config.to_string_lossy().into_owned();

    let hits = search_json(&["weather", "simulations"], &["--config", &config]);
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_stats() {
    let out = docdex(&["stats"], &[index_path().as_path()]);
    assert!(out.status.success(), "stats failed: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Document count:   3"));
    assert!(text.contains("docdex=1"));
}

#[test]
fn test_docs_table() {
    let out = docdex(&["docs", "--color", "never"], &[index_path().as_path()]);
    assert!(out.status.success());
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("index"));
    assert!(lines[1].contains("tutorials/arrays"));
    assert!(lines[2].contains("Weather data"));
}

#[test]
fn test_validate_ok() {
    let out = docdex(&["validate"], &[index_path().as_path()]);
    assert!(out.status.success(), "validate failed: {}", stderr(&out));
    assert!(stdout(&out).contains("ok (3 documents)"));
}

#[test]
fn test_validate_reports_violations() {
    let corrupt = get_fixture_dir().join("corrupt.js");
    fs::write(
        &corrupt,
        r#"Search.setIndex({"docnames": ["a", "b"], "filenames": ["a.md"], "titles": ["A", "B"],
            "terms": {"weather": [0, 7]}, "titleterms": {}, "objects": {}, "objtypes": {},
            "objnames": {}, "envversion": {}})"#,
    )
    .unwrap();

    let out = docdex(&["validate"], &[corrupt.as_path()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("violation"));
}

#[test]
fn test_search_rejects_corrupt_index() {
    let broken = get_fixture_dir().join("broken.js");
    fs::write(&broken, "Search.setIndex({\"docnames\": [").unwrap();

    let out = docdex(&["docs"], &[broken.as_path()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Failed to load index"));
}

#[test]
fn test_missing_index_is_an_error() {
    let out = docdex(&["stats"], &[get_fixture_dir().join("nope.js").as_path()]);
    assert!(!out.status.success());
}
