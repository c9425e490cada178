//! BibTeX parsing for ADS bulk exports
//!
//! The ADS export endpoint returns a single text blob with one `@ARTICLE{...}`
//! (or similar) per requested bibcode, keyed by the bibcode itself. This
//! crate turns that blob into entries with case-insensitive field access.
//!
//! Features:
//! - Nom-based parser with per-entry error recovery
//! - @string definitions, @preamble and @comment skipping
//! - Braced, quoted and concatenated (`#`) field values
//! - Serde support so parsed entries can live inside snapshots

mod entry;
pub mod parser;

pub use entry::BibTeXEntry;
pub use parser::{entries_by_key, parse, BibTeXParseError, BibTeXParseResult, ParseError};
