use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Position of a document in the parallel `docnames`/`filenames`/`titles` arrays
pub type DocIndex = usize;

/// Version recorded under `envversion` by this builder
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Key under which the builder records its version in `envversion`
pub const ENV_VERSION_KEY: &str = "docdex";

/// Documents a term points at: a bare index when exactly one document
/// contains it, a sorted list otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocRefs {
    One(DocIndex),
    Many(Vec<DocIndex>),
}

impl DocRefs {
    /// Collapse a sorted, de-duplicated list into the compact form.
    pub fn from_sorted(mut docs: Vec<DocIndex>) -> Self {
        if docs.len() == 1 {
            DocRefs::One(docs.remove(0))
        } else {
            DocRefs::Many(docs)
        }
    }

    pub fn as_slice(&self) -> &[DocIndex] {
        match self {
            DocRefs::One(doc) => std::slice::from_ref(doc),
            DocRefs::Many(docs) => docs,
        }
    }

    pub fn contains(&self, doc: DocIndex) -> bool {
        self.as_slice().contains(&doc)
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// One API object: `[doc, objtype, priority, anchor, name]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub doc: DocIndex,
    pub objtype: usize,
    pub priority: i32,
    pub anchor: String,
    pub name: String,
}

impl Serialize for ObjectEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.doc)?;
        seq.serialize_element(&self.objtype)?;
        seq.serialize_element(&self.priority)?;
        seq.serialize_element(&self.anchor)?;
        seq.serialize_element(&self.name)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ObjectEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = ObjectEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array [doc, objtype, priority, anchor, name]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ObjectEntry, A::Error> {
                let doc = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let objtype = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let priority = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(2, &self))?;
                let anchor = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(3, &self))?;
                let name = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(4, &self))?;
                Ok(ObjectEntry {
                    doc,
                    objtype,
                    priority,
                    anchor,
                    name,
                })
            }
        }

        deserializer.deserialize_seq(EntryVisitor)
    }
}

/// Reference from a section title to the page holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRef(pub DocIndex, pub Option<String>);

impl TitleRef {
    pub fn doc(&self) -> DocIndex {
        self.0
    }

    pub fn anchor(&self) -> Option<&str> {
        self.1.as_deref()
    }
}

/// The whole search index as serialized inside `Search.setIndex(...)`.
///
/// `docnames`, `filenames` and `titles` are parallel arrays; every other
/// map refers to documents by their position in them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub docnames: Vec<String>,
    pub filenames: Vec<String>,
    /// Page titles, HTML-escaped
    pub titles: Vec<String>,
    pub terms: BTreeMap<String, DocRefs>,
    #[serde(default)]
    pub objects: BTreeMap<String, Vec<ObjectEntry>>,
    #[serde(default)]
    pub objtypes: BTreeMap<String, String>,
    #[serde(default)]
    pub objnames: BTreeMap<String, (String, String, String)>,
    pub titleterms: BTreeMap<String, DocRefs>,
    /// Section titles (HTML-escaped) to the pages and anchors holding them
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alltitles: BTreeMap<String, Vec<TitleRef>>,
    #[serde(default)]
    pub envversion: BTreeMap<String, u32>,
}

impl SearchIndex {
    pub fn doc_count(&self) -> usize {
        self.docnames.len()
    }

    /// Human-readable (unescaped) title of a document
    pub fn display_title(&self, doc: DocIndex) -> String {
        self.titles
            .get(doc)
            .map(|t| crate::utils::html::unescape(t))
            .unwrap_or_default()
    }

    /// Objtype label for an object entry, e.g. "Python function"
    pub fn objtype_label(&self, objtype: usize) -> Option<&str> {
        self.objnames
            .get(&objtype.to_string())
            .map(|(_, _, label)| label.as_str())
    }

    /// Objtype short name for an object entry, e.g. "function"
    pub fn objtype_name(&self, objtype: usize) -> Option<&str> {
        self.objnames
            .get(&objtype.to_string())
            .map(|(_, name, _)| name.as_str())
    }
}

/// Configuration for the indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// File extensions treated as documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns (relative to the source root) to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Files larger than this are skipped
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_extensions() -> Vec<String> {
    ["md", "markdown", "ipynb", "rst", "txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude() -> Vec<String> {
    vec![
        "_build/**".to_string(),
        "**/.ipynb_checkpoints/**".to_string(),
        "**/node_modules/**".to_string(),
    ]
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: default_exclude(),
            max_file_size: default_max_file_size(),
        }
    }
}
