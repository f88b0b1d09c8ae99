use crate::index::types::SearchIndex;
use crate::query::{parse_query, MatchMode, ScoringWeights, SearchExecutor, SearchHit, Summarizer};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Instant;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Search,
    Help,
}

/// LRU cache size for search results
const SEARCH_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(64).unwrap();

/// Rows moved by PageUp/PageDown
const PAGE_SIZE: usize = 10;

/// Application state
pub struct App {
    index: SearchIndex,
    weights: ScoringWeights,
    match_mode: MatchMode,
    limit: usize,
    summarizer: Option<Summarizer>,
    pub query: String,
    pub results: Vec<SearchHit>,
    pub selected: usize,
    pub mode: Mode,
    pub status_message: String,
    /// Query the current results belong to
    searched: String,
    search_cache: LruCache<String, Vec<SearchHit>>,
}

impl App {
    pub fn new(index: SearchIndex, weights: ScoringWeights, match_mode: MatchMode, limit: usize) -> Self {
        let status_message = format!("{} documents loaded", index.doc_count());
        Self {
            index,
            weights,
            match_mode,
            limit,
            summarizer: None,
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            mode: Mode::Search,
            status_message,
            searched: String::new(),
            search_cache: LruCache::new(SEARCH_CACHE_SIZE),
        }
    }

    /// Attach summaries read from the documentation sources
    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refresh();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.refresh();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.refresh();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.refresh();
    }

    /// Delete the last word of the query
    pub fn delete_word(&mut self) {
        let trimmed = self.query.trim_end();
        let cut = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.query.truncate(cut);
        self.refresh();
    }

    /// Re-run the search if the query changed since the last run
    pub fn refresh(&mut self) {
        let key = self.query.trim().to_string();
        if key == self.searched {
            return;
        }
        self.searched = key.clone();
        self.selected = 0;

        if key.is_empty() {
            self.results.clear();
            self.status_message = format!("{} documents loaded", self.index.doc_count());
            return;
        }

        if let Some(hits) = self.search_cache.get(&key) {
            self.results = hits.clone();
            self.status_message = format!("{} results (cached)", self.results.len());
            return;
        }

        let start = Instant::now();
        let parsed = parse_query(&key);
        let mut hits = SearchExecutor::new(&self.index)
            .with_weights(self.weights.clone())
            .with_mode(self.match_mode)
            .with_limit(self.limit)
            .search(&parsed);
        if let Some(summarizer) = self.summarizer.as_mut() {
            summarizer.annotate(&mut hits, &parsed.highlight_terms);
        }
        let elapsed = start.elapsed();
        tracing::debug!(query = %key, hits = hits.len(), ?elapsed, "interactive search");

        self.status_message = format!("{} results in {:.1}ms", hits.len(), elapsed.as_secs_f64() * 1000.0);
        self.search_cache.put(key, hits.clone());
        self.results = hits;
    }

    pub fn selected_hit(&self) -> Option<&SearchHit> {
        self.results.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_page_down(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + PAGE_SIZE).min(self.results.len() - 1);
        }
    }

    pub fn select_page_up(&mut self) {
        self.selected = self.selected.saturating_sub(PAGE_SIZE);
    }

    pub fn show_help(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn hide_help(&mut self) {
        self.mode = Mode::Search;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::DocRefs;

    fn app() -> App {
        let mut index = SearchIndex {
            docnames: vec!["index".into(), "tutorials/weather".into(), "tutorials/arrays".into()],
            filenames: vec!["index.md".into(), "tutorials/weather.ipynb".into(), "tutorials/arrays.md".into()],
            titles: vec!["Welcome".into(), "Weather data".into(), "Array simulations".into()],
            ..Default::default()
        };
        index.terms.insert("weather".into(), DocRefs::Many(vec![0, 1]));
        index.terms.insert("arrai".into(), DocRefs::Many(vec![0, 1, 2]));
        index.titleterms.insert("weather".into(), DocRefs::One(1));
        index.titleterms.insert("arrai".into(), DocRefs::One(2));
        App::new(index, ScoringWeights::default(), MatchMode::All, 50)
    }

    #[test]
    fn test_search_as_you_type() {
        let mut app = app();
        for c in "weather".chars() {
            app.push_char(c);
        }
        assert_eq!(app.results.len(), 2);
        assert_eq!(app.results[0].docname, "tutorials/weather");

        app.clear_query();
        assert!(app.results.is_empty());
    }

    #[test]
    fn test_cached_results() {
        let mut app = app();
        app.set_query("array");
        let first = app.results.clone();
        app.set_query("weather");
        app.set_query("array");
        assert_eq!(app.results, first);
        assert!(app.status_message.contains("cached"));
    }

    #[test]
    fn test_selection_bounds() {
        let mut app = app();
        app.set_query("array");
        assert_eq!(app.results.len(), 3);
        app.select_prev();
        assert_eq!(app.selected, 0);
        app.select_page_down();
        assert_eq!(app.selected, 2);
        app.select_next();
        assert_eq!(app.selected, 2);
        app.select_page_up();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_delete_word() {
        let mut app = app();
        app.set_query("weather array");
        app.delete_word();
        assert_eq!(app.query, "weather ");
        app.delete_word();
        assert_eq!(app.query, "");
    }
}
