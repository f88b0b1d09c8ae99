use crate::index::builder::IndexBuilder;
use crate::index::extract::{extract_document, DocumentText};
use crate::index::types::{BuildConfig, SearchIndex};
use crate::index::writer::write_index;
use crate::utils::progress::{discovery_spinner, extraction_bar};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Result of extracting a single source file (computed in parallel)
pub struct ProcessedDoc {
    pub docname: String,
    pub filename: String,
    pub text: DocumentText,
}

/// Summary of a finished build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub skipped: usize,
    pub terms: usize,
    pub titleterms: usize,
}

/// Docname and filename for a path relative to the source root. Both use
/// `/` separators regardless of platform.
pub fn doc_identity(rel_path: &Path) -> (String, String) {
    let parts: Vec<String> = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let filename = parts.join("/");
    let docname = match rel_path.extension() {
        Some(ext) => {
            let ext_len = ext.to_string_lossy().len() + 1;
            filename[..filename.len() - ext_len].to_string()
        }
        None => filename.clone(),
    };
    (docname, filename)
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid exclude glob: {pattern}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Find candidate documents under `root`, as (full path, relative path).
pub fn discover_documents(root: &Path, config: &BuildConfig) -> Result<Vec<(PathBuf, PathBuf)>> {
    let exclude = build_exclude_set(&config.exclude)?;
    let extensions: Vec<String> = config
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !matches!(
                name.as_ref(),
                ".git" | "node_modules" | "__pycache__" | ".venv" | "venv" | ".ipynb_checkpoints"
            )
        })
        .build();

    let mut entries: Vec<(PathBuf, PathBuf)> = walker
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| {
            let path = entry.path().to_path_buf();
            let rel_path = path.strip_prefix(root).ok()?.to_path_buf();
            let ext = rel_path.extension()?.to_str()?.to_ascii_lowercase();
            if !extensions.contains(&ext) || exclude.is_match(&rel_path) {
                return None;
            }
            Some((path, rel_path))
        })
        .collect();

    entries.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

/// Build an in-memory index from every document under `root`.
pub fn build_from_dir(root: &Path, config: &BuildConfig, silent: bool) -> Result<(SearchIndex, BuildReport)> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Invalid source directory: {}", root.display()))?;

    let spinner = discovery_spinner(silent);
    let entries = discover_documents(&root, config)?;
    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Found {} documents", entries.len()));
    }
    tracing::info!(root = %root.display(), candidates = entries.len(), "discovered documents");

    let bar = extraction_bar(entries.len() as u64, silent);
    let skipped = AtomicUsize::new(0);
    let max_file_size = config.max_file_size;

    let processed: Vec<ProcessedDoc> = entries
        .par_iter()
        .filter_map(|(full_path, rel_path)| {
            let result = process_document(full_path, rel_path, max_file_size);
            if let Some(ref bar) = bar {
                bar.inc(1);
            }
            match result {
                Ok(Some(doc)) => Some(doc),
                Ok(None) => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
                Err(e) => {
                    tracing::warn!(path = %rel_path.display(), "skipping document: {e:#}");
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
            }
        })
        .collect();

    if let Some(bar) = bar {
        bar.finish_with_message(format!("Extracted {} documents", processed.len()));
    }

    // Sources sharing a docname (intro.md, intro.rst) would share one page;
    // the first in path order wins.
    let mut builder = IndexBuilder::new();
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut duplicates = 0;
    for doc in &processed {
        match seen.entry(doc.docname.as_str()) {
            Entry::Occupied(kept) => {
                tracing::warn!(
                    docname = %doc.docname,
                    kept = %kept.get(),
                    skipped = %doc.filename,
                    "skipping document with duplicate docname"
                );
                duplicates += 1;
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(doc.filename.as_str());
            }
        }
        builder.feed(&doc.docname, &doc.filename, &doc.text);
    }
    let index = builder.freeze();

    let report = BuildReport {
        documents: index.doc_count(),
        skipped: skipped.load(Ordering::Relaxed) + duplicates,
        terms: index.terms.len(),
        titleterms: index.titleterms.len(),
    };
    Ok((index, report))
}

fn process_document(full_path: &Path, rel_path: &Path, max_file_size: u64) -> Result<Option<ProcessedDoc>> {
    let size = full_path.metadata()?.len();
    if size > max_file_size {
        tracing::warn!(path = %rel_path.display(), size, "skipping oversized document");
        return Ok(None);
    }

    let content = fs::read_to_string(full_path)
        .with_context(|| format!("Failed to read {}", full_path.display()))?;
    let text = extract_document(rel_path, &content)?;
    let (docname, filename) = doc_identity(rel_path);
    tracing::debug!(%docname, "extracted document");

    Ok(Some(ProcessedDoc {
        docname,
        filename,
        text,
    }))
}

/// Build the index for `source` and write it to `output`.
pub fn build_index(source: &Path, output: &Path, config: &BuildConfig, silent: bool) -> Result<BuildReport> {
    if !silent {
        println!("Indexing: {}", source.display());
    }

    let (index, report) = build_from_dir(source, config, silent)?;
    if report.documents == 0 {
        anyhow::bail!("No documents found under {}", source.display());
    }

    write_index(&index, output)?;

    if !silent {
        println!(
            "Indexed {} documents ({} terms, {} title terms)",
            report.documents, report.terms, report.titleterms
        );
        if report.skipped > 0 {
            eprintln!("({} documents skipped)", report.skipped);
        }
        println!("Index written to: {}", output.display());
    }

    Ok(report)
}
