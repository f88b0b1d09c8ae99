#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let query = docdex::query::parse_query(data);
    // Stemming never empties a word
    for term in &query.terms {
        assert!(!term.is_empty());
    }
});
