use crate::index::reader::{load_index, load_index_unchecked};
use crate::index::types::SearchIndex;
use crate::index::validate::validate;
use anyhow::Result;
use std::path::Path;

/// Number of most frequent terms shown by `stats`
const TOP_TERMS: usize = 10;

/// Counts describing an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub titleterms: usize,
    pub objects: usize,
    pub objtypes: usize,
    pub alltitles: usize,
    /// Terms with the most documents, most frequent first
    pub top_terms: Vec<(String, usize)>,
}

impl IndexStats {
    pub fn collect(index: &SearchIndex) -> Self {
        let mut top_terms: Vec<(String, usize)> = index
            .terms
            .iter()
            .map(|(term, refs)| (term.clone(), refs.len()))
            .collect();
        top_terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_terms.truncate(TOP_TERMS);

        Self {
            documents: index.doc_count(),
            terms: index.terms.len(),
            titleterms: index.titleterms.len(),
            objects: index.objects.values().map(Vec::len).sum(),
            objtypes: index.objtypes.len(),
            alltitles: index.alltitles.len(),
            top_terms,
        }
    }
}

/// Display index statistics
pub fn show_stats(index_path: &Path) -> Result<()> {
    let index = load_index(index_path)?;
    let stats = IndexStats::collect(&index);

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", index_path.display());
    if let Ok(meta) = index_path.metadata() {
        println!("Index size:       {}", format_size(meta.len()));
    }
    let env: Vec<String> = index
        .envversion
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    println!("Environment:      {}", env.join(", "));
    println!("Document count:   {}", stats.documents);
    println!("Terms:            {}", stats.terms);
    println!("Title terms:      {}", stats.titleterms);
    println!("Objects:          {} ({} types)", stats.objects, stats.objtypes);
    println!("Section titles:   {}", stats.alltitles);

    if !stats.top_terms.is_empty() {
        println!();
        println!("Most common terms:");
        for (term, count) in &stats.top_terms {
            println!("  {:20} {}", term, count);
        }
    }

    Ok(())
}

/// Check an index file and print every violation. Returns the violation count.
pub fn validate_report(index_path: &Path) -> Result<usize> {
    let index = load_index_unchecked(index_path)?;
    let violations = validate(&index);

    if violations.is_empty() {
        println!(
            "{}: ok ({} documents)",
            index_path.display(),
            index.doc_count()
        );
    } else {
        for violation in &violations {
            eprintln!("{}: {}", index_path.display(), violation);
        }
        eprintln!("{} violation(s) found", violations.len());
    }
    tracing::debug!(violations = violations.len(), "validated index");

    Ok(violations.len())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
