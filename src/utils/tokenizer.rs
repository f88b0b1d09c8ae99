use super::stemmer::stem;

/// English stopwords shared by the indexer and the query parser.
pub const STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Check if a word is a stopword. The comparison is exact, so `For` is not
/// a stopword while `for` is.
#[inline]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Split text into maximal runs of word characters (letters, digits, `_`).
pub fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if is_word_char(ch) {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            words.push(&text[s..i]);
        }
    }

    if let Some(s) = start {
        words.push(&text[s..]);
    }

    words
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Decide whether a (stemmed or raw) word may be stored in the index.
///
/// Rejects stopwords and one- or two-character words starting with hiragana.
pub fn word_filter(word: &str) -> bool {
    let Some(first) = word.chars().next() else {
        return true;
    };
    let code = first as u32;
    let short_hiragana = word.chars().count() < 3 && (12354..12436).contains(&code);
    let stop = code < 256 && is_stopword(word);
    !(short_hiragana || stop)
}

/// Normalize a body word the way the indexer does: the stem when it passes
/// the filter, else the raw word when that passes, else nothing.
pub fn index_term(word: &str) -> Option<String> {
    let stemmed = stem(word);
    if word_filter(&stemmed) {
        Some(stemmed)
    } else if word_filter(word) {
        Some(word.to_string())
    } else {
        None
    }
}

/// Normalize a title word. Unlike body words the raw fallback is lowercased.
pub fn title_term(word: &str) -> Option<String> {
    let stemmed = stem(word);
    if word_filter(&stemmed) {
        Some(stemmed)
    } else if word_filter(word) {
        Some(word.to_lowercase())
    } else {
        None
    }
}
