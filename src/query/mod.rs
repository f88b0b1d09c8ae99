pub mod executor;
pub mod parser;
pub mod scorer;
pub mod summary;

pub use executor::{MatchMode, SearchExecutor, SearchHit};
pub use parser::{parse_query, ParsedQuery};
pub use scorer::ScoringWeights;
pub use summary::{make_summary, Summarizer};
