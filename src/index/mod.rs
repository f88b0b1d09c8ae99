pub mod build;
pub mod builder;
pub mod extract;
pub mod reader;
pub mod stats;
pub mod types;
pub mod validate;
pub mod writer;

pub use builder::IndexBuilder;
pub use reader::{load_index, parse_index, IndexError};
pub use types::*;
pub use validate::{validate, Violation};
pub use writer::{to_js, write_index};
