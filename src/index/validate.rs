//! Structural checks on a loaded index.
//!
//! The search side indexes straight into the parallel arrays, so every
//! document reference has to be in bounds before a query runs.

use crate::index::types::{DocIndex, SearchIndex};
use std::fmt;

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `filenames` or `titles` length differs from `docnames`
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A document reference points past the end of `docnames`
    DocOutOfBounds {
        field: &'static str,
        key: String,
        doc: DocIndex,
    },
    /// An object uses an objtype with no `objtypes`/`objnames` entry
    UnknownObjType { key: String, objtype: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} has {actual} entries but docnames has {expected}"
            ),
            Violation::DocOutOfBounds { field, key, doc } => {
                write!(f, "{field}[{key:?}] references document {doc} which does not exist")
            }
            Violation::UnknownObjType { key, objtype } => {
                write!(f, "objects[{key:?}] uses undefined objtype {objtype}")
            }
        }
    }
}

/// Collect every invariant violation in the index.
pub fn validate(index: &SearchIndex) -> Vec<Violation> {
    let mut violations = Vec::new();
    let doc_count = index.docnames.len();

    for (field, len) in [
        ("filenames", index.filenames.len()),
        ("titles", index.titles.len()),
    ] {
        if len != doc_count {
            violations.push(Violation::LengthMismatch {
                field,
                expected: doc_count,
                actual: len,
            });
        }
    }

    for (field, map) in [("terms", &index.terms), ("titleterms", &index.titleterms)] {
        for (key, refs) in map {
            for &doc in refs.as_slice() {
                if doc >= doc_count {
                    violations.push(Violation::DocOutOfBounds {
                        field,
                        key: key.clone(),
                        doc,
                    });
                }
            }
        }
    }

    for (title, refs) in &index.alltitles {
        for r in refs {
            if r.doc() >= doc_count {
                violations.push(Violation::DocOutOfBounds {
                    field: "alltitles",
                    key: title.clone(),
                    doc: r.doc(),
                });
            }
        }
    }

    for (prefix, entries) in &index.objects {
        for entry in entries {
            if entry.doc >= doc_count {
                violations.push(Violation::DocOutOfBounds {
                    field: "objects",
                    key: prefix.clone(),
                    doc: entry.doc,
                });
            }
            let key = entry.objtype.to_string();
            if !index.objtypes.contains_key(&key) || !index.objnames.contains_key(&key) {
                violations.push(Violation::UnknownObjType {
                    key: prefix.clone(),
                    objtype: entry.objtype,
                });
            }
        }
    }

    violations
}
