//! Publication-list rendering strategies
//!
//! Rendering is split into three pluggable pieces:
//! - [`NameFormatter`]: how one member name is marked up
//! - [`AuthorFormat`]: the author line of a record
//! - [`EntryFormat`]: the full entry, given the author line
//!
//! Each trait is implemented for matching closures, so callers and tests
//! can pass plain functions.

mod authors;
mod encoding;
mod entry;

pub use authors::AuthorsFormatter;
pub use encoding::{default_tex_substitutions, TargetEncoding, Transcoder};
pub use entry::{entry_formatter_html, entry_formatter_tex, name_formatter_html, name_formatter_tex};

use crate::articles::{ArticleRecord, BibliographyCache};

pub trait NameFormatter {
    fn format_name(&self, name: &str) -> String;
}

impl<F: Fn(&str) -> String> NameFormatter for F {
    fn format_name(&self, name: &str) -> String {
        self(name)
    }
}

pub trait AuthorFormat {
    fn format_authors(&self, record: &ArticleRecord) -> String;
}

impl<F: Fn(&ArticleRecord) -> String> AuthorFormat for F {
    fn format_authors(&self, record: &ArticleRecord) -> String {
        self(record)
    }
}

pub trait EntryFormat {
    fn render(
        &self,
        bibliography: &BibliographyCache,
        record: &ArticleRecord,
        formatted_authors: &str,
    ) -> String;
}

impl<F: Fn(&BibliographyCache, &ArticleRecord, &str) -> String> EntryFormat for F {
    fn render(
        &self,
        bibliography: &BibliographyCache,
        record: &ArticleRecord,
        formatted_authors: &str,
    ) -> String {
        self(bibliography, record, formatted_authors)
    }
}

/// The two built-in output flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `\entry{title}{authors}{journal}{url}` macros
    Tex,
    /// `<li>` items with DOI / arXiv / ADS links
    Html,
}

impl NameFormatter for OutputFormat {
    fn format_name(&self, name: &str) -> String {
        match self {
            OutputFormat::Tex => name_formatter_tex(name),
            OutputFormat::Html => name_formatter_html(name),
        }
    }
}

impl EntryFormat for OutputFormat {
    fn render(
        &self,
        bibliography: &BibliographyCache,
        record: &ArticleRecord,
        formatted_authors: &str,
    ) -> String {
        match self {
            OutputFormat::Tex => entry_formatter_tex(bibliography, record, formatted_authors),
            OutputFormat::Html => entry_formatter_html(bibliography, record, formatted_authors),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tex" | "latex" => Ok(OutputFormat::Tex),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}
