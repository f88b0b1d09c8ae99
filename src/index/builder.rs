use crate::index::extract::DocumentText;
use crate::index::types::*;
use crate::utils::html;
use crate::utils::{index_term, split_words, title_term};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

/// A page registered with the builder
struct PageEntry {
    filename: String,
    /// Escaped page title
    title: String,
    /// Escaped section titles and their anchors (`None` for the page title)
    sections: Vec<(String, Option<String>)>,
}

/// In-memory accumulator for one index build.
///
/// Documents are fed in any order; `freeze` sorts them by docname and
/// rewrites every posting into positions of the final parallel arrays.
#[derive(Default)]
pub struct IndexBuilder {
    pages: BTreeMap<String, PageEntry>,
    /// Body term -> docnames
    mapping: FxHashMap<String, BTreeSet<String>>,
    /// Title term -> docnames
    title_mapping: FxHashMap<String, BTreeSet<String>>,
    stem_cache: FxHashMap<String, Option<String>>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc_count(&self) -> usize {
        self.pages.len()
    }

    /// Add one document. Feeding the same docname twice replaces its page
    /// entry and merges its terms.
    pub fn feed(&mut self, docname: &str, filename: &str, doc: &DocumentText) {
        let title = doc.title.clone().unwrap_or_else(|| docname.to_string());

        let mut sections = Vec::with_capacity(doc.sections.len());
        for (i, section) in doc.sections.iter().enumerate() {
            let anchor = if i == 0 && doc.title.as_deref() == Some(section.title.as_str()) {
                None
            } else if section.anchor.is_empty() {
                None
            } else {
                Some(section.anchor.clone())
            };
            sections.push((html::escape(&section.title), anchor));

            for word in split_words(&section.title) {
                if let Some(term) = title_term(word) {
                    self.title_mapping
                        .entry(term)
                        .or_default()
                        .insert(docname.to_string());
                }
            }
        }

        // A page without headings still contributes its fallback title
        if doc.sections.is_empty() {
            for word in split_words(&title) {
                if let Some(term) = title_term(word) {
                    self.title_mapping
                        .entry(term)
                        .or_default()
                        .insert(docname.to_string());
                }
            }
        }

        for word in split_words(&doc.body) {
            let Some(term) = self.body_term(word) else {
                continue;
            };
            let already_indexed = self
                .title_mapping
                .get(&term)
                .is_some_and(|docs| docs.contains(docname));
            if !already_indexed {
                self.mapping
                    .entry(term)
                    .or_default()
                    .insert(docname.to_string());
            }
        }

        tracing::debug!(docname, sections = sections.len(), "fed document");
        self.pages.insert(
            docname.to_string(),
            PageEntry {
                filename: filename.to_string(),
                title: html::escape(&title),
                sections,
            },
        );
    }

    fn body_term(&mut self, word: &str) -> Option<String> {
        if let Some(cached) = self.stem_cache.get(word) {
            return cached.clone();
        }
        let term = index_term(word);
        self.stem_cache.insert(word.to_string(), term.clone());
        term
    }

    /// Produce the final index.
    pub fn freeze(self) -> SearchIndex {
        let positions: FxHashMap<&str, DocIndex> = self
            .pages
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut index = SearchIndex::default();
        let mut alltitles: BTreeMap<String, Vec<TitleRef>> = BTreeMap::new();

        for (i, (docname, page)) in self.pages.iter().enumerate() {
            index.docnames.push(docname.clone());
            index.filenames.push(page.filename.clone());
            index.titles.push(page.title.clone());
            for (title, anchor) in &page.sections {
                alltitles
                    .entry(title.clone())
                    .or_default()
                    .push(TitleRef(i, anchor.clone()));
            }
        }

        index.terms = freeze_mapping(&self.mapping, &positions);
        index.titleterms = freeze_mapping(&self.title_mapping, &positions);
        index.alltitles = alltitles;
        index
            .envversion
            .insert(ENV_VERSION_KEY.to_string(), INDEX_FORMAT_VERSION);
        index
    }
}

fn freeze_mapping(
    mapping: &FxHashMap<String, BTreeSet<String>>,
    positions: &FxHashMap<&str, DocIndex>,
) -> BTreeMap<String, DocRefs> {
    mapping
        .iter()
        .filter_map(|(term, docnames)| {
            let mut docs: Vec<DocIndex> = docnames
                .iter()
                .filter_map(|name| positions.get(name.as_str()).copied())
                .collect();
            if docs.is_empty() {
                return None;
            }
            docs.sort_unstable();
            Some((term.clone(), DocRefs::from_sorted(docs)))
        })
        .collect()
}
