#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that parses and validates must be searchable without panicking
    if let Ok(index) = docdex::index::parse_index(data) {
        let _ = docdex::query::SearchExecutor::new(&index).search_str("weather -data");
    }
});
