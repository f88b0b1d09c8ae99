//! Output formatting for search results and index listings

use crate::index::types::SearchIndex;
use crate::query::executor::SearchHit;
use clap::ValueEnum;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// When to color terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto if io::IsTerminal::is_terminal(&io::stdout()) => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

pub fn stdout(mode: ColorMode) -> StandardStream {
    StandardStream::stdout(mode.choice())
}

/// Print hits as a ranked list: title, link, description and summary
pub fn print_hits<W: WriteColor>(out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
    if hits.is_empty() {
        writeln!(out, "No results.")?;
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:>3}. ", rank + 1)?;
        out.reset()?;

        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "{}", hit.title)?;
        out.reset()?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(out, " [{}]", hit.score)?;
        out.reset()?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "     {}", hit.link())?;
        out.reset()?;
        writeln!(out, "  ({})", hit.filename)?;

        if let Some(description) = &hit.description {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            writeln!(out, "     {description}")?;
            out.reset()?;
        }
        if let Some(summary) = &hit.summary {
            writeln!(out, "     {summary}")?;
        }
    }

    Ok(())
}

/// Print hits as a JSON array
pub fn print_hits_json<W: Write>(out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, hits)?;
    writeln!(out)
}

/// Print the document table of an index
pub fn print_docs<W: WriteColor>(out: &mut W, index: &SearchIndex) -> io::Result<()> {
    let width = column_width(&index.docnames);
    let file_width = column_width(&index.filenames);

    for (doc, docname) in index.docnames.iter().enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{doc:>5}  ")?;
        out.reset()?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{docname:<width$}")?;
        out.reset()?;
        let filename = index.filenames.get(doc).map(String::as_str).unwrap_or("");
        writeln!(out, "  {filename:<file_width$}  {}", index.display_title(doc))?;
    }

    Ok(())
}

fn column_width(values: &[String]) -> usize {
    values.iter().map(|v| v.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn hit() -> SearchHit {
        SearchHit {
            docname: "tutorials/weather".into(),
            title: "Tutorial 1 & 5 > Weather data".into(),
            anchor: Some("weather-data".into()),
            description: None,
            score: 16,
            filename: "tutorials/weather.ipynb".into(),
            matched_terms: 1,
            summary: Some("Download NSRDB weather data.".into()),
            doc: 0,
        }
    }

    #[test]
    fn test_print_hits_plain() {
        let mut buf = Buffer::no_color();
        print_hits(&mut buf, &[hit()]).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.contains("  1. Tutorial 1 & 5 > Weather data [16]"));
        assert!(text.contains("tutorials/weather.html#weather-data  (tutorials/weather.ipynb)"));
        assert!(text.contains("Download NSRDB weather data."));
    }

    #[test]
    fn test_print_no_hits() {
        let mut buf = Buffer::no_color();
        print_hits(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), "No results.\n");
    }

    #[test]
    fn test_print_hits_json() {
        let mut out = Vec::new();
        print_hits_json(&mut out, &[hit()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["anchor"], "weather-data");
        assert_eq!(value[0]["score"], 16);
        assert!(value[0].get("doc").is_none());
        assert!(value[0].get("description").is_none());
    }

    #[test]
    fn test_print_docs_table() {
        let index = SearchIndex {
            docnames: vec!["index".into(), "tutorials/weather".into()],
            filenames: vec!["index.md".into(), "tutorials/weather.ipynb".into()],
            titles: vec!["Welcome".into(), "Tutorial 1 &amp; 5".into()],
            ..Default::default()
        };
        let mut buf = Buffer::no_color();
        print_docs(&mut buf, &index).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    0  index              index.md                 Welcome");
        assert_eq!(lines[1], "    1  tutorials/weather  tutorials/weather.ipynb  Tutorial 1 & 5");
    }
}
