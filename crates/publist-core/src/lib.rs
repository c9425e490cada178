//! publist-core: publication lists for a group of people, built from NASA ADS
//!
//! This crate provides:
//!
//! - **Members**: the roster of tracked people and the ADS queries that find them
//! - **Affiliation**: deciding whether a matched author was at the organization
//! - **Articles**: aggregating search results, curation (removal, white-listing,
//!   collaboration confirmation) and snapshot persistence
//! - **Format**: pluggable author-line and entry rendering for TeX and HTML
//! - **Sources**: the [`LiteratureService`] seam and its ADS implementation
//! - **Config**: TOML configuration with the organization's filters
//!
//! # Workflow
//!
//! ```text
//! roster CSV → MemberRegistry → ArticleStore::add (per member)
//!            → curation → update_bibliography → formatted lines
//! ```

pub mod affiliation;
pub mod articles;
pub mod bibcode;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod members;
pub mod sources;

pub use publist_bibtex::BibTeXEntry;

pub use affiliation::{AffiliationMatcher, Verdict, NO_AFFILIATION};
pub use articles::{
    ArticleRecord, ArticleStore, BibliographyCache, Snapshot, SnapshotError, VerificationItem,
};
pub use config::{
    AdsConfig, AffiliationConfig, ConfigError, FilterConfig, OutputConfig, PublistConfig,
    QueryConfig, RosterConfig,
};
pub use error::{PublistError, RegistryError, Result, RosterError};
pub use format::{
    entry_formatter_html, entry_formatter_tex, name_formatter_html, name_formatter_tex,
    AuthorFormat, AuthorsFormatter, EntryFormat, NameFormatter, OutputFormat, TargetEncoding,
    Transcoder,
};
pub use members::{fetch_roster, load_roster, load_roster_str, Member, MemberRegistry};
pub use sources::{
    AdsClient, LiteratureService, SearchRecord, SearchRequest, SourceError,
};
