use crate::utils::{is_stopword, split_words, stem};

/// Parsed query representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Trimmed, lowercased query text (matched against section titles)
    pub raw: String,
    /// Stemmed words every result should contain, in first-seen order
    pub terms: Vec<String>,
    /// Stemmed words no result may contain (`-word`)
    pub excluded: Vec<String>,
    /// Lowercase unstemmed words of the whole query (object names)
    pub object_terms: Vec<String>,
    /// Lowercase unstemmed words to highlight in summaries
    pub highlight_terms: Vec<String>,
}

impl ParsedQuery {
    /// True when the query has no searchable word (empty or only stopwords)
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Parse a query string into a ParsedQuery structure
///
/// Whitespace separates chunks; a chunk starting with `-` excludes the words
/// it contains. Stopwords are dropped and the remaining words stemmed the same
/// way the indexer stems body text.
pub fn parse_query(input: &str) -> ParsedQuery {
    let raw = input.trim().to_lowercase();
    let mut query = ParsedQuery {
        raw: raw.clone(),
        ..Default::default()
    };

    for word in split_words(&raw) {
        push_unique(&mut query.object_terms, word.to_string());
    }

    for chunk in input.split_whitespace() {
        let (negated, body) = match chunk.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, chunk),
        };

        for word in split_words(body) {
            let lower = word.to_lowercase();
            if is_stopword(&lower) {
                continue;
            }
            let stemmed = stem(&lower);
            if negated {
                push_unique(&mut query.excluded, stemmed);
            } else {
                push_unique(&mut query.terms, stemmed);
                push_unique(&mut query.highlight_terms, lower);
            }
        }
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_terms_are_stemmed() {
        let q = parse_query("Running Tutorials");
        assert_eq!(q.terms, vec!["run", "tutori"]);
        assert_eq!(q.highlight_terms, vec!["running", "tutorials"]);
        assert_eq!(q.raw, "running tutorials");
    }

    #[test]
    fn test_stopwords_dropped() {
        let q = parse_query("the weather of the array");
        assert_eq!(q.terms, vec!["weather", "arrai"]);
        // object terms keep every word
        assert_eq!(q.object_terms, vec!["the", "weather", "of", "array"]);
    }

    #[test]
    fn test_excluded_terms() {
        let q = parse_query("radiance -gencumsky -install");
        assert_eq!(q.terms, vec!["radianc"]);
        assert_eq!(q.excluded, vec!["gencumski", "instal"]);
        assert_eq!(q.highlight_terms, vec!["radiance"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let q = parse_query("run runs running");
        assert_eq!(q.terms, vec!["run"]);
    }

    #[test]
    fn test_empty_and_stopword_only() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("   ").is_empty());
        let q = parse_query("the and");
        assert!(q.is_empty());
        assert_eq!(q.object_terms, vec!["the", "and"]);
    }

    #[test]
    fn test_punctuation_splits_words() {
        let q = parse_query("bifacial_radiance.RadianceObj()");
        assert_eq!(q.object_terms, vec!["bifacial_radiance", "radianceobj"]);
    }
}
