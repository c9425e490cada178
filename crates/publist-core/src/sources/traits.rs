//! The literature-service seam
//!
//! The store only ever talks to a [`LiteratureService`]; production code
//! plugs in [`AdsClient`](super::AdsClient), tests plug in canned records.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::bibcode;
use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(HttpError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rate limited")]
    RateLimit,
    #[error("Unauthorized: check the ADS API token")]
    Unauthorized,
    #[error("No ADS API token found (set ADS_API_TOKEN or write ~/.ads/dev_key)")]
    MissingToken,
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SourceError::RateLimit,
            HttpError::Status { status: 401 | 403, .. } => SourceError::Unauthorized,
            other => SourceError::Http(other),
        }
    }
}

/// One search result, in the shape the service returns it
///
/// `aff` runs parallel to `author` but may be shorter; ADS uses `"-"` for
/// authors without affiliation data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRecord {
    pub bibcode: String,
    #[serde(default)]
    pub author: Vec<String>,
    #[serde(default)]
    pub aff: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    /// `YYYY-MM-DD`, day (and sometimes month) zeroed
    #[serde(default)]
    pub pubdate: String,
    #[serde(default)]
    pub first_author: String,
}

impl SearchRecord {
    /// First title, or an empty string
    pub fn title(&self) -> &str {
        self.title.first().map(String::as_str).unwrap_or_default()
    }

    pub fn journal(&self) -> &str {
        bibcode::journal_code(&self.bibcode)
    }
}

/// A single search: the member query plus the store-wide constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub fields: Vec<String>,
    pub constraints: BTreeMap<String, String>,
    pub rows: u32,
    pub max_pages: u32,
}

impl SearchRequest {
    /// Query string with every constraint appended as a `field:value` term
    pub fn full_query(&self) -> String {
        let mut q = self.query.clone();
        for (field, value) in &self.constraints {
            q.push(' ');
            q.push_str(field);
            q.push(':');
            q.push_str(value);
        }
        q
    }
}

/// External literature-search service
///
/// Calls block; failures are returned as-is and never retried here.
pub trait LiteratureService {
    /// Run a query and return every matching record
    fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, SourceError>;

    /// Export the given records as one BibTeX blob keyed by bibcode
    fn export_bibtex(&self, bibcodes: &[String]) -> Result<String, SourceError>;
}

impl<T: LiteratureService + ?Sized> LiteratureService for &T {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, SourceError> {
        (**self).search(request)
    }

    fn export_bibtex(&self, bibcodes: &[String]) -> Result<String, SourceError> {
        (**self).export_bibtex(bibcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_query_appends_constraints() {
        let request = SearchRequest {
            query: r#"=author:"Smith, J*""#.to_string(),
            fields: vec!["bibcode".to_string()],
            constraints: BTreeMap::from([
                ("database".to_string(), "astronomy".to_string()),
                ("pubdate".to_string(), "[2014-09 TO 2015-08]".to_string()),
            ]),
            rows: 10,
            max_pages: 1,
        };
        assert_eq!(
            request.full_query(),
            r#"=author:"Smith, J*" database:astronomy pubdate:[2014-09 TO 2015-08]"#
        );
    }

    #[test]
    fn test_status_mapping() {
        let err: SourceError = HttpError::Status {
            status: 401,
            body: String::new(),
        }
        .into();
        assert!(matches!(err, SourceError::Unauthorized));

        let err: SourceError = HttpError::RateLimited.into();
        assert!(matches!(err, SourceError::RateLimit));

        let err: SourceError = HttpError::Status {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, SourceError::Http(HttpError::Status { status: 500, .. })));
    }

    #[test]
    fn test_search_record_defaults() {
        let record: SearchRecord = serde_json::from_str(r#"{"bibcode": "2015ApJ...806..206A"}"#).unwrap();
        assert_eq!(record.title(), "");
        assert_eq!(record.journal(), "ApJ");
        assert!(record.aff.is_empty());
    }
}
