use crate::index::extract::{extract_document, flatten};
use crate::query::executor::SearchHit;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Characters of context kept before the match
const LEADING_CONTEXT: usize = 120;
/// Length of the snippet window
const SUMMARY_LEN: usize = 240;

/// Build a snippet of `text` around the last highlight term that occurs in
/// it. Returns `None` when no term occurs.
pub fn make_summary(text: &str, keywords: &[String]) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = chars.iter().map(|c| lower_char(*c)).collect();

    let position = keywords
        .iter()
        .filter_map(|k| find_chars(&lower, &k.chars().map(lower_char).collect::<Vec<_>>()))
        .next_back()?;

    let start = position.saturating_sub(LEADING_CONTEXT);
    let end = (start + SUMMARY_LEN).min(chars.len());
    let window: String = chars[start..end].iter().collect();

    let head = if start == 0 { "" } else { "..." };
    let tail = if start + SUMMARY_LEN < chars.len() { "..." } else { "" };
    Some(format!("{head}{}{tail}", window.trim()))
}

/// Single-char lowercase keeps char offsets aligned with the original text
fn lower_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Reads source documents to attach summaries to hits
pub struct Summarizer {
    source_root: PathBuf,
    cache: HashMap<String, Option<String>>,
}

impl Summarizer {
    pub fn new(source_root: &Path) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    /// Flattened body text of a source file, cached per filename
    fn body(&mut self, filename: &str) -> Option<&str> {
        if !self.cache.contains_key(filename) {
            let text = match self.load(filename) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(filename, "no summary available: {e:#}");
                    None
                }
            };
            self.cache.insert(filename.to_string(), text);
        }
        self.cache.get(filename).and_then(|t| t.as_deref())
    }

    fn load(&self, filename: &str) -> Result<String> {
        let path = self.source_root.join(filename.replace('\\', "/"));
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = extract_document(&path, &content)?;
        Ok(flatten(&doc.body))
    }

    /// Fill in `summary` on every hit that has a readable source
    pub fn annotate(&mut self, hits: &mut [SearchHit], keywords: &[String]) {
        for hit in hits.iter_mut() {
            if let Some(body) = self.body(&hit.filename) {
                hit.summary = make_summary(body, keywords);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_summary_short_text() {
        let summary = make_summary("Download NSRDB weather data.", &kw(&["weather"])).unwrap();
        assert_eq!(summary, "Download NSRDB weather data.");
    }

    #[test]
    fn test_summary_window_and_ellipses() {
        let text = format!("{}Weather{}", "a".repeat(300), "b".repeat(300));
        let summary = make_summary(&text, &kw(&["weather"])).unwrap();
        assert!(summary.starts_with("..."));
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), SUMMARY_LEN + 6);
        assert!(summary.contains("Weather"));
    }

    #[test]
    fn test_summary_uses_last_found_keyword() {
        let text = format!("alpha {} omega", "x".repeat(400));
        let summary = make_summary(&text, &kw(&["alpha", "missing", "omega"])).unwrap();
        assert!(summary.ends_with("omega"));
    }

    #[test]
    fn test_summary_no_keyword() {
        assert!(make_summary("nothing here", &kw(&["weather"])).is_none());
        assert!(make_summary("nothing here", &[]).is_none());
    }

    #[test]
    fn test_annotate_reads_sources() {
        let dir = std::env::temp_dir().join(format!("docdex_summary_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("intro.md"), "# Welcome\n\nClick the rocket icon.\n").unwrap();

        let mut hits = vec![SearchHit {
            docname: "intro".into(),
            title: "Welcome".into(),
            anchor: None,
            description: None,
            score: 5,
            filename: "intro.md".into(),
            matched_terms: 1,
            summary: None,
            doc: 0,
        }];
        let mut summarizer = Summarizer::new(&dir);
        summarizer.annotate(&mut hits, &kw(&["rocket"]));
        assert_eq!(hits[0].summary.as_deref(), Some("Welcome Click the rocket icon."));
        let _ = fs::remove_dir_all(&dir);
    }
}
