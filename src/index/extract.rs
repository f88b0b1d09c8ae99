//! Plain-text extraction from documentation sources.
//!
//! Produces the page title, the section titles (with the anchors a rendered
//! page would give them) and the searchable body text. Markdown, Jupyter
//! notebooks, reStructuredText and plain text are understood.

use crate::utils::html;
use anyhow::{Context, Result};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid regex"));

/// Characters that may underline a reStructuredText section title
const RST_ADORNMENTS: &[char] = &['=', '-', '~', '^', '"', '\'', '*', '+', '#'];

/// Kind of source document, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Markdown,
    Notebook,
    Rst,
    Text,
}

impl DocKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => DocKind::Markdown,
            "ipynb" => DocKind::Notebook,
            "rst" => DocKind::Rst,
            _ => DocKind::Text,
        }
    }
}

/// A section heading found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub anchor: String,
}

/// Searchable content of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText {
    /// Page title (first heading), if the document has one
    pub title: Option<String>,
    /// Every heading, including the one used as the page title
    pub sections: Vec<Section>,
    pub body: String,
}

impl DocumentText {
    /// Record a heading; `anchor` overrides the slug of the title.
    fn push_heading(&mut self, text: &str, anchor: Option<String>) {
        let title = flatten(text);
        if title.is_empty() {
            return;
        }
        if self.title.is_none() {
            self.title = Some(title.clone());
        }
        self.push_body(&title);
        self.sections.push(Section {
            anchor: anchor.unwrap_or_else(|| slugify(&title)),
            title,
        });
    }

    fn push_body(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(text.trim_end());
    }
}

/// Extract the searchable text of a document.
pub fn extract_document(path: &Path, content: &str) -> Result<DocumentText> {
    let mut doc = DocumentText::default();
    match DocKind::from_path(path) {
        DocKind::Markdown => extract_markdown(content, &mut doc),
        DocKind::Notebook => extract_notebook(content, &mut doc)
            .with_context(|| format!("Failed to parse notebook {}", path.display()))?,
        DocKind::Rst => extract_rst(content, &mut doc),
        DocKind::Text => extract_text(content, &mut doc),
    }
    Ok(doc)
}

/// Collapse the body into single-spaced text for display.
pub fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Anchor slug: lowercase, runs of non-alphanumerics collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Strip HTML tags and decode entities.
fn clean_inline(text: &str) -> String {
    let text = HTML_TAG.replace_all(text, " ");
    let text = html::unescape(&text);
    text.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '`')
        .to_string()
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Walk the CommonMark event stream. Inline markup and link or image
/// targets vanish; every closed block becomes one body entry.
fn extract_markdown(content: &str, doc: &mut DocumentText) {
    let mut block = String::new();
    // (text, explicit id) of the heading being read
    let mut heading: Option<(String, Option<String>)> = None;
    let mut in_metadata = false;

    for event in Parser::new_ext(content, markdown_options()) {
        match event {
            Event::Start(Tag::Heading { id, .. }) => {
                flush_block(doc, &mut block);
                heading = Some((String::new(), id.map(|id| id.to_string())));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((text, anchor)) = heading.take() {
                    doc.push_heading(&text, anchor);
                }
            }
            Event::Start(Tag::MetadataBlock(_)) => in_metadata = true,
            Event::End(TagEnd::MetadataBlock(_)) => in_metadata = false,
            Event::Text(text) | Event::Code(text) => {
                if !in_metadata {
                    markdown_target(&mut heading, &mut block).push_str(&text);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                let text = html::unescape(&HTML_TAG.replace_all(&raw, " "));
                markdown_target(&mut heading, &mut block).push_str(&text);
            }
            Event::SoftBreak | Event::HardBreak => {
                let sep = if heading.is_some() { ' ' } else { '\n' };
                markdown_target(&mut heading, &mut block).push(sep);
            }
            Event::End(
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image,
            ) => {}
            Event::End(_) => flush_block(doc, &mut block),
            _ => {}
        }
    }
    flush_block(doc, &mut block);
}

fn markdown_target<'a>(heading: &'a mut Option<(String, Option<String>)>, block: &'a mut String) -> &'a mut String {
    match heading {
        Some((text, _)) => text,
        None => block,
    }
}

fn flush_block(doc: &mut DocumentText, block: &mut String) {
    doc.push_body(block);
    block.clear();
}

/// `source` and `text` fields are either one string or a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultiLine {
    One(String),
    Many(Vec<String>),
}

impl Default for MultiLine {
    fn default() -> Self {
        MultiLine::One(String::new())
    }
}

impl MultiLine {
    fn joined(&self) -> String {
        match self {
            MultiLine::One(s) => s.clone(),
            MultiLine::Many(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: MultiLine,
    #[serde(default)]
    outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
struct Output {
    output_type: String,
    #[serde(default)]
    text: Option<MultiLine>,
    #[serde(default)]
    data: BTreeMap<String, serde_json::Value>,
}

impl Output {
    fn plain_text(&self) -> Option<String> {
        match self.output_type.as_str() {
            "stream" => self.text.as_ref().map(MultiLine::joined),
            "execute_result" | "display_data" => self
                .data
                .get("text/plain")
                .cloned()
                .and_then(|v| serde_json::from_value::<MultiLine>(v).ok())
                .map(|m| m.joined()),
            _ => None,
        }
    }
}

fn extract_notebook(content: &str, doc: &mut DocumentText) -> Result<()> {
    let notebook: Notebook = serde_json::from_str(content)?;

    for cell in &notebook.cells {
        let source = cell.source.joined();
        match cell.cell_type.as_str() {
            "markdown" => extract_markdown(&source, doc),
            _ => {
                for line in source.lines() {
                    doc.push_body(line);
                }
            }
        }

        for output in &cell.outputs {
            if let Some(text) = output.plain_text() {
                for line in text.lines() {
                    doc.push_body(line);
                }
            }
        }
    }

    Ok(())
}

fn is_rst_underline(line: &str, title: &str) -> bool {
    let line = line.trim_end();
    let Some(first) = line.chars().next() else {
        return false;
    };
    RST_ADORNMENTS.contains(&first)
        && line.chars().all(|c| c == first)
        && line.chars().count() >= title.trim().chars().count()
}

fn extract_rst(content: &str, doc: &mut DocumentText) {
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let is_title = !line.trim().is_empty()
            && !is_rst_underline(line, "")
            && lines
                .get(i + 1)
                .is_some_and(|next| is_rst_underline(next, line));

        if is_title {
            doc.push_heading(&clean_inline(line), None);
            i += 2;
            continue;
        }

        if is_rst_underline(line, "") || line.trim_start().starts_with(".. ") {
            i += 1;
            continue;
        }

        doc.push_body(&html::unescape(line));
        i += 1;
    }
}

fn extract_text(content: &str, doc: &mut DocumentText) {
    let mut lines = content.lines();
    for line in lines.by_ref() {
        if !line.trim().is_empty() {
            doc.push_heading(&clean_inline(line), None);
            break;
        }
    }
    for line in lines {
        doc.push_body(line);
    }
}
