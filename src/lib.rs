//! # docdex - documentation site search indexes
//!
//! docdex builds, inspects and queries the `searchindex.js` file a static
//! documentation site ships for client-side search. The index is a single
//! JSON object wrapped in `Search.setIndex(...)`, mapping stemmed terms and
//! title terms to the pages that contain them.
//!
//! ## Architecture
//!
//! - [`index`] - Index types, reading, validation, writing and building
//! - [`query`] - Query parsing, scoring, execution and result summaries
//! - [`tui`] - Interactive search box (feature `interactive`)
//! - [`output`] - Result formatting
//! - [`utils`] - Tokenizer, stemmer, config, logging and progress bars
//!
//! ## Quick Start
//!
//! ```
//! use docdex::index::parse_index;
//! use docdex::query::SearchExecutor;
//!
//! let js = br#"Search.setIndex({"docnames": ["intro"], "filenames": ["intro.md"],
//!     "titles": ["Welcome"], "terms": {"rocket": 0}, "titleterms": {"welcom": 0},
//!     "objects": {}, "objtypes": {}, "objnames": {}, "envversion": {}})"#;
//! let index = parse_index(js).unwrap();
//!
//! let hits = SearchExecutor::new(&index).search_str("rocket");
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].link(), "intro.html");
//! ```

pub mod index;
pub mod output;
pub mod query;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
