use crate::index::types::{DocIndex, DocRefs, ObjectEntry, SearchIndex};
use crate::query::parser::{parse_query, ParsedQuery};
use crate::query::scorer::ScoringWeights;
use crate::utils::html;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// How multi-word queries combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every query term must match (short terms may be waived)
    #[default]
    All,
    /// Any query term may match; more matched terms rank higher
    Any,
}

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub docname: String,
    /// Display title, unescaped ("Page > Section" for section hits)
    pub title: String,
    /// Fragment within the page, without `#`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Object description, e.g. "Python class, in Tutorial 2"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub score: i64,
    pub filename: String,
    /// Number of query terms this hit accounts for
    pub matched_terms: usize,
    /// Text snippet around the first match, when sources are available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip)]
    pub doc: DocIndex,
}

impl SearchHit {
    /// Link target relative to the site root: `docname.html#anchor`
    pub fn link(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}.html#{}", self.docname, anchor),
            None => format!("{}.html", self.docname),
        }
    }
}

/// Executes parsed queries against a loaded index
pub struct SearchExecutor<'a> {
    index: &'a SearchIndex,
    weights: ScoringWeights,
    mode: MatchMode,
    limit: usize,
}

impl<'a> SearchExecutor<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self {
            index,
            weights: ScoringWeights::default(),
            mode: MatchMode::default(),
            limit: usize::MAX,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Parse and run a query string
    pub fn search_str(&self, query: &str) -> Vec<SearchHit> {
        self.search(&parse_query(query))
    }

    /// Run a parsed query, returning hits best-first
    pub fn search(&self, query: &ParsedQuery) -> Vec<SearchHit> {
        // stopword-only queries match nothing, objects and titles included
        if query.is_empty() {
            return Vec::new();
        }

        let excluded = self.excluded_docs(query);

        let mut hits = self.section_title_hits(query);
        hits.extend(self.object_hits(query));
        hits.extend(self.term_hits(query));
        hits.retain(|hit| !excluded.contains(hit.doc as u32));

        self.rank(&mut hits);

        let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
        hits.retain(|hit| seen.insert((hit.docname.clone(), hit.anchor.clone())));
        hits.truncate(self.limit);

        tracing::debug!(
            terms = ?query.terms,
            excluded = ?query.excluded,
            hits = hits.len(),
            "executed query"
        );
        hits
    }

    fn rank(&self, hits: &mut [SearchHit]) {
        let mode = self.mode;
        hits.sort_by(|a, b| {
            let by_terms = match mode {
                MatchMode::Any => b.matched_terms.cmp(&a.matched_terms),
                MatchMode::All => std::cmp::Ordering::Equal,
            };
            by_terms
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                .then_with(|| a.docname.cmp(&b.docname))
        });
    }

    fn excluded_docs(&self, query: &ParsedQuery) -> RoaringBitmap {
        let mut docs = RoaringBitmap::new();
        for term in &query.excluded {
            for map in [&self.index.terms, &self.index.titleterms] {
                if let Some(refs) = map.get(term) {
                    docs.extend(refs.as_slice().iter().map(|&d| d as u32));
                }
            }
        }
        docs
    }

    /// Every (refs, score) record a term contributes: exact body and title
    /// matches, plus substring matches for longer terms without an exact key.
    fn term_records(&self, term: &str) -> Vec<(&'a DocRefs, i64)> {
        let index = self.index;
        let mut records = Vec::new();

        let maps: [(&'a BTreeMap<String, DocRefs>, i64, i64); 2] = [
            (&index.terms, self.weights.term, self.weights.partial_term),
            (&index.titleterms, self.weights.title, self.weights.partial_title),
        ];

        for (map, exact, partial) in maps {
            match map.get(term) {
                Some(refs) => records.push((refs, exact)),
                None if term.chars().count() > 2 => {
                    for (key, refs) in map {
                        if key.contains(term) {
                            records.push((refs, partial));
                        }
                    }
                }
                None => {}
            }
        }

        records
    }

    fn term_hits(&self, query: &ParsedQuery) -> Vec<SearchHit> {
        // doc -> best score per query term
        let mut scores: FxHashMap<DocIndex, Vec<Option<i64>>> = FxHashMap::default();
        let term_count = query.terms.len();

        for (slot, term) in query.terms.iter().enumerate() {
            for (refs, score) in self.term_records(term) {
                for &doc in refs.as_slice() {
                    let per_term = scores.entry(doc).or_insert_with(|| vec![None; term_count]);
                    let best = per_term[slot].get_or_insert(score);
                    *best = (*best).max(score);
                }
            }
        }

        let long_slots: Vec<usize> = query
            .terms
            .iter()
            .enumerate()
            .filter(|(_, t)| t.chars().count() > 2)
            .map(|(slot, _)| slot)
            .collect();

        scores
            .into_iter()
            .filter_map(|(doc, per_term)| {
                let matched = per_term.iter().flatten().count();
                let qualifies = match self.mode {
                    // every term, or every term longer than two chars
                    MatchMode::All => {
                        matched == term_count
                            || (!long_slots.is_empty()
                                && long_slots.iter().all(|&slot| per_term[slot].is_some()))
                    }
                    MatchMode::Any => matched > 0,
                };
                if !qualifies || doc >= self.index.doc_count() {
                    return None;
                }
                let score = per_term.iter().flatten().copied().max()?;
                Some(self.page_hit(doc, score, matched))
            })
            .collect()
    }

    /// Source filename of a document; empty when the index lacks one
    fn filename(&self, doc: DocIndex) -> String {
        self.index.filenames.get(doc).cloned().unwrap_or_default()
    }

    fn page_hit(&self, doc: DocIndex, score: i64, matched_terms: usize) -> SearchHit {
        SearchHit {
            docname: self.index.docnames[doc].clone(),
            title: self.index.display_title(doc),
            anchor: None,
            description: None,
            score,
            filename: self.filename(doc),
            matched_terms,
            summary: None,
            doc,
        }
    }

    /// Section titles containing the whole query, where the query covers at
    /// least half of the title.
    fn section_title_hits(&self, query: &ParsedQuery) -> Vec<SearchHit> {
        let raw = query.raw.as_str();
        let raw_len = raw.chars().count();
        if raw_len == 0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (stored_title, refs) in &self.index.alltitles {
            let title = html::unescape(stored_title);
            let title_len = title.chars().count();
            if raw_len * 2 < title_len || !title.to_lowercase().contains(raw) {
                continue;
            }

            for title_ref in refs {
                let doc = title_ref.doc();
                if doc >= self.index.doc_count() {
                    continue;
                }
                let is_page_title = self.index.titles.get(doc) == Some(stored_title);
                let display = if is_page_title {
                    title.clone()
                } else {
                    format!("{} > {}", self.index.display_title(doc), title)
                };
                hits.push(SearchHit {
                    docname: self.index.docnames[doc].clone(),
                    title: display,
                    anchor: title_ref.anchor().map(str::to_string),
                    description: None,
                    score: self.weights.section_title(raw_len, title_len, is_page_title),
                    filename: self.filename(doc),
                    matched_terms: query.terms.len(),
                    summary: None,
                    doc,
                });
            }
        }
        hits
    }

    fn object_hits(&self, query: &ParsedQuery) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        for term in &query.object_terms {
            for (prefix, entries) in &self.index.objects {
                for entry in entries {
                    if let Some(hit) = self.match_object(term, prefix, entry, query) {
                        hits.push(hit);
                    }
                }
            }
        }
        hits
    }

    fn match_object(
        &self,
        term: &str,
        prefix: &str,
        entry: &ObjectEntry,
        query: &ParsedQuery,
    ) -> Option<SearchHit> {
        let index = self.index;
        if entry.doc >= index.doc_count() {
            return None;
        }

        let fullname = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}.{}", entry.name)
        };
        let fullname_lower = fullname.to_lowercase();
        if !fullname_lower.contains(term) {
            return None;
        }

        let last = fullname_lower.rsplit('.').next().unwrap_or(&fullname_lower);
        let mut score = if fullname_lower == term || last == term {
            self.weights.obj_name_match
        } else if last.contains(term) {
            self.weights.obj_partial_match
        } else {
            0
        };

        let label = index.objtype_label(entry.objtype).unwrap_or("");
        let page_title = index.display_title(entry.doc);

        let others: Vec<&String> = query.object_terms.iter().filter(|t| *t != term).collect();
        if !others.is_empty() {
            let haystack = format!("{prefix} {} {label} {page_title}", entry.name).to_lowercase();
            if others.iter().any(|t| !haystack.contains(t.as_str())) {
                return None;
            }
        }

        let anchor = match entry.anchor.as_str() {
            "" => fullname.clone(),
            "-" => format!(
                "{}-{}",
                index.objtype_name(entry.objtype).unwrap_or(""),
                fullname
            ),
            other => other.to_string(),
        };

        score += self.weights.object_priority(entry.priority);

        Some(SearchHit {
            docname: index.docnames[entry.doc].clone(),
            title: fullname,
            anchor: Some(anchor),
            description: Some(format!("{label}, in {page_title}")),
            score,
            filename: self.filename(entry.doc),
            matched_terms: query.object_terms.len(),
            summary: None,
            doc: entry.doc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{ObjectEntry, TitleRef};

    /// Index shaped like a small tutorial site
    fn site_index() -> SearchIndex {
        let mut index = SearchIndex {
            docnames: vec![
                "README".into(),
                "intro".into(),
                "tutorials/1 - NSRDB Weather".into(),
                "tutorials/2_bifacial_radiance".into(),
            ],
            filenames: vec![
                "README.md".into(),
                "intro.md".into(),
                "tutorials/1 - NSRDB Weather.ipynb".into(),
                "tutorials/2_bifacial_radiance.ipynb".into(),
            ],
            titles: vec![
                "bifacial_radiance Training".into(),
                "Welcome to the interactive bifacial_radiance Training".into(),
                "Tutorial 1 &amp; 5 - NSRDB Weather Data".into(),
                "2_bifacial_radiance".into(),
            ],
            ..Default::default()
        };
        let terms: &[(&str, DocRefs)] = &[
            ("run", DocRefs::Many(vec![0, 1, 2, 3])),
            ("weather", DocRefs::One(3)),
            ("rocket", DocRefs::Many(vec![0, 1])),
            ("irradi", DocRefs::Many(vec![2, 3])),
            ("gencumski", DocRefs::One(3)),
            ("instal", DocRefs::Many(vec![0, 2])),
        ];
        for (k, v) in terms {
            index.terms.insert(k.to_string(), v.clone());
        }
        let titleterms: &[(&str, DocRefs)] = &[
            ("train", DocRefs::Many(vec![0, 1])),
            ("welcom", DocRefs::One(1)),
            ("weather", DocRefs::One(2)),
            ("nsrdb", DocRefs::One(2)),
            ("2_bifacial_radi", DocRefs::One(3)),
            ("bifacial_radi", DocRefs::Many(vec![0, 1])),
        ];
        for (k, v) in titleterms {
            index.titleterms.insert(k.to_string(), v.clone());
        }
        index.alltitles.insert(
            "Tutorial 1 &amp; 5 - NSRDB Weather Data".into(),
            vec![TitleRef(2, None)],
        );
        index
            .alltitles
            .insert("2_bifacial_radiance".into(), vec![TitleRef(3, None)]);
        index.alltitles.insert(
            "Weather data".into(),
            vec![TitleRef(3, Some("weather-data".into()))],
        );
        index
    }

    fn docnames(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.docname.as_str()).collect()
    }

    #[test]
    fn test_unknown_token_returns_nothing() {
        let index = site_index();
        assert!(SearchExecutor::new(&index).search_str("zzzqqq").is_empty());
    }

    #[test]
    fn test_single_title_token_returns_that_document() {
        let index = site_index();
        let hits = SearchExecutor::new(&index).search_str("welcome");
        assert_eq!(docnames(&hits), vec!["intro"]);
        assert_eq!(hits[0].score, 15);
        assert_eq!(hits[0].title, "Welcome to the interactive bifacial_radiance Training");
    }

    #[test]
    fn test_title_outranks_body() {
        let index = site_index();
        let hits = SearchExecutor::new(&index).search_str("weather");
        // doc 2 has it as a title term (15), doc 3 as a body term (5) and a
        // section title "Weather data" (15 * 7/12 rounded = 9)
        assert_eq!(hits[0].docname, "tutorials/1 - NSRDB Weather");
        assert_eq!(hits[0].score, 15);
        let section = hits
            .iter()
            .find(|h| h.anchor.as_deref() == Some("weather-data"))
            .unwrap();
        assert_eq!(section.title, "2_bifacial_radiance > Weather data");
        assert_eq!(section.score, 9);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_all_mode_requires_every_term() {
        let index = site_index();
        let hits = SearchExecutor::new(&index).search_str("rocket training");
        let mut names = docnames(&hits);
        names.sort();
        assert_eq!(names, vec!["README", "intro"]);

        let hits = SearchExecutor::new(&index).search_str("rocket gencumsky");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_all_mode_short_terms_do_not_stand_in_for_long_ones() {
        let mut index = SearchIndex {
            docnames: vec!["a".into(), "b".into()],
            filenames: vec!["a.md".into(), "b.md".into()],
            titles: vec!["A".into(), "B".into()],
            ..Default::default()
        };
        index.terms.insert("ab".into(), DocRefs::One(0));
        index.terms.insert("rocket".into(), DocRefs::One(1));

        // "a" only has the short term; "b" has every long term
        let hits = SearchExecutor::new(&index).search_str("ab rocket");
        assert_eq!(docnames(&hits), vec!["b"]);

        // with no long terms every term must match
        let hits = SearchExecutor::new(&index).search_str("ab xy");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_stopword_query_returns_nothing() {
        let mut index = site_index();
        index
            .alltitles
            .insert("Then".into(), vec![TitleRef(0, None)]);
        assert!(SearchExecutor::new(&index).search_str("then").is_empty());
        assert!(SearchExecutor::new(&index).search_str("the and").is_empty());
        assert!(SearchExecutor::new(&index).search_str("   ").is_empty());
    }

    #[test]
    fn test_missing_filename_does_not_panic() {
        let mut index = SearchIndex {
            docnames: vec!["a".into(), "b".into()],
            filenames: vec!["a.md".into()],
            titles: vec!["A".into()],
            ..Default::default()
        };
        index.terms.insert("rocket".into(), DocRefs::Many(vec![0, 1]));
        index.alltitles.insert("Rocket".into(), vec![TitleRef(1, None)]);

        let hits = SearchExecutor::new(&index).search_str("rocket");
        assert_eq!(hits.len(), 2);
        let b = hits.iter().find(|h| h.docname == "b").unwrap();
        assert_eq!(b.filename, "");
        // section-title hit (15) outranks the body term (5)
        assert_eq!(b.score, 15);
    }

    #[test]
    fn test_any_mode_ranks_by_matched_terms() {
        let index = site_index();
        let hits = SearchExecutor::new(&index)
            .with_mode(MatchMode::Any)
            .search_str("rocket gencumsky welcome");
        assert_eq!(hits[0].docname, "intro");
        assert_eq!(hits[0].matched_terms, 2);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_partial_matches() {
        let index = site_index();
        let hits = SearchExecutor::new(&index).search_str("radi");
        // no exact key: "irradi" (body, 2) and "*bifacial_radi" (title, 7)
        let best: Vec<(&str, i64)> = hits.iter().map(|h| (h.docname.as_str(), h.score)).collect();
        assert_eq!(best[0].1, 7);
        assert_eq!(hits.len(), 4);
        assert!(best.contains(&("tutorials/1 - NSRDB Weather", 2)));
    }

    #[test]
    fn test_short_terms_skip_partial_matching() {
        let index = site_index();
        assert!(SearchExecutor::new(&index).search_str("ru").is_empty());
    }

    #[test]
    fn test_excluded_terms_drop_documents() {
        let index = site_index();
        let hits = SearchExecutor::new(&index).search_str("run -install");
        let mut names = docnames(&hits);
        names.sort();
        assert_eq!(names, vec!["intro", "tutorials/2_bifacial_radiance"]);
    }

    #[test]
    fn test_limit_and_dedupe() {
        let index = site_index();
        let hits = SearchExecutor::new(&index).with_limit(2).search_str("run");
        assert_eq!(hits.len(), 2);

        // page title hit and term hit for the same page collapse into one
        let hits = SearchExecutor::new(&index).search_str("2_bifacial_radiance");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 16);
        assert!(hits[0].anchor.is_none());
    }

    #[test]
    fn test_object_search() {
        let mut index = site_index();
        index.objtypes.insert("0".into(), "py:class".into());
        index.objnames.insert(
            "0".into(),
            ("py".into(), "class".into(), "Python class".into()),
        );
        index.objects.insert(
            "bifacial_radiance".into(),
            vec![
                ObjectEntry {
                    doc: 3,
                    objtype: 0,
                    priority: 1,
                    anchor: String::new(),
                    name: "RadianceObj".into(),
                },
                ObjectEntry {
                    doc: 3,
                    objtype: 0,
                    priority: 1,
                    anchor: "-".into(),
                    name: "GroundObj".into(),
                },
            ],
        );

        let hits = SearchExecutor::new(&index).search_str("radianceobj");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "bifacial_radiance.RadianceObj");
        assert_eq!(hits[0].anchor.as_deref(), Some("bifacial_radiance.RadianceObj"));
        assert_eq!(hits[0].score, 16);
        assert_eq!(
            hits[0].description.as_deref(),
            Some("Python class, in 2_bifacial_radiance")
        );
        assert_eq!(
            hits[0].link(),
            "tutorials/2_bifacial_radiance.html#bifacial_radiance.RadianceObj"
        );

        let hits = SearchExecutor::new(&index).search_str("ground");
        assert_eq!(hits[0].anchor.as_deref(), Some("class-bifacial_radiance.GroundObj"));
        assert_eq!(hits[0].score, 11);
    }
}
