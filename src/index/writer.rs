use crate::index::reader::SET_INDEX_CALL;
use crate::index::types::SearchIndex;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render the index as the script a documentation site loads.
pub fn to_js(index: &SearchIndex) -> Result<String> {
    let json = serde_json::to_string(index).context("Failed to serialize index")?;
    Ok(format!("{SET_INDEX_CALL}{json})"))
}

/// Write the index to `path`, replacing any previous index wholesale.
///
/// The script is written to a temporary sibling first and renamed into
/// place, so readers never observe a half-written file.
pub fn write_index(index: &SearchIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("js.tmp");
    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(SET_INDEX_CALL.as_bytes())?;
        serde_json::to_writer(&mut writer, index).context("Failed to serialize index")?;
        writer.write_all(b")")?;
        writer.flush()?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move index into {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        docs = index.doc_count(),
        terms = index.terms.len(),
        titleterms = index.titleterms.len(),
        "wrote search index"
    );
    Ok(())
}
