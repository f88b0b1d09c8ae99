use crate::index::types::SearchIndex;
use crate::index::validate::{validate, Violation};
use memchr::memmem;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Call wrapping the JSON payload in a generated `searchindex.js`
pub const SET_INDEX_CALL: &str = "Search.setIndex(";

/// Failure kinds when loading an index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no index payload found (expected `Search.setIndex({{...}})` or a JSON object)")]
    MissingPayload,

    #[error("`Search.setIndex(` call is not closed")]
    UnterminatedCall,

    #[error("malformed index JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index is inconsistent: {0}")]
    Invalid(Violation),
}

/// Load and validate an index file.
pub fn load_index(path: &Path) -> Result<SearchIndex, IndexError> {
    let index = load_index_unchecked(path)?;
    check(&index)?;
    tracing::info!(
        path = %path.display(),
        docs = index.doc_count(),
        terms = index.terms.len(),
        "loaded search index"
    );
    Ok(index)
}

/// Load an index file without checking its invariants (used by `validate`).
pub fn load_index_unchecked(path: &Path) -> Result<SearchIndex, IndexError> {
    let io_err = |source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let len = file.metadata().map_err(io_err)?.len();
    if len == 0 {
        return Err(IndexError::MissingPayload);
    }

    // SAFETY: the index is a build artifact that is replaced by rename,
    // never rewritten in place while mapped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
    parse_index_unchecked(&mmap)
}

/// Parse and validate an index from memory.
pub fn parse_index(bytes: &[u8]) -> Result<SearchIndex, IndexError> {
    let index = parse_index_unchecked(bytes)?;
    check(&index)?;
    Ok(index)
}

/// Parse an index from memory without checking its invariants.
pub fn parse_index_unchecked(bytes: &[u8]) -> Result<SearchIndex, IndexError> {
    let payload = extract_payload(bytes)?;
    Ok(serde_json::from_slice(payload)?)
}

/// Fail on the first invariant violation.
pub fn check(index: &SearchIndex) -> Result<(), IndexError> {
    match validate(index).into_iter().next() {
        Some(violation) => Err(IndexError::Invalid(violation)),
        None => Ok(()),
    }
}

/// Locate the JSON object inside `Search.setIndex(...)`, or accept a bare
/// JSON object.
fn extract_payload(bytes: &[u8]) -> Result<&[u8], IndexError> {
    let bytes = strip_bom(bytes).trim_ascii();

    if let Some(pos) = memmem::find(bytes, SET_INDEX_CALL.as_bytes()) {
        let inner = &bytes[pos + SET_INDEX_CALL.len()..];
        let inner = inner.trim_ascii();
        let inner = inner
            .strip_suffix(b";")
            .map(<[u8]>::trim_ascii)
            .unwrap_or(inner);
        let inner = inner
            .strip_suffix(b")")
            .ok_or(IndexError::UnterminatedCall)?
            .trim_ascii();
        if inner.first() != Some(&b'{') {
            return Err(IndexError::MissingPayload);
        }
        return Ok(inner);
    }

    if bytes.first() == Some(&b'{') {
        Ok(bytes)
    } else {
        Err(IndexError::MissingPayload)
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
