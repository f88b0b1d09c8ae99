//! Utility functions shared by the indexer and the query side.
//!
//! ## Modules
//!
//! - [`app_data`] - Configuration file and app data directory
//! - [`html`] - Entity escaping for stored titles
//! - [`logging`] - tracing subscriber setup
//! - [`progress`] - Progress bars (no-op without the `progress` feature)
//! - [`stemmer`] - Porter stemmer
//! - [`tokenizer`] - Word splitting, stopwords and the index word filter
//!
//! ## Key Functions
//!
//! ```
//! use docdex::utils::{split_words, stem};
//!
//! let words = split_words("Running tutorials");
//! assert_eq!(words, vec!["Running", "tutorials"]);
//! assert_eq!(stem("tutorials"), "tutori");
//! ```

pub mod app_data;
pub mod html;
pub mod logging;
pub mod progress;
pub mod stemmer;
pub mod tokenizer;

pub use app_data::*;
pub use logging::init_logging;
pub use stemmer::stem;
pub use tokenizer::*;
