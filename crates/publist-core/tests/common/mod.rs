//! Shared test doubles and record builders

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use publist_core::sources::{LiteratureService, SearchRecord, SearchRequest, SourceError};

/// In-memory literature service
///
/// Searches are answered by member query (constraints are ignored); every
/// call is logged so tests can assert on traffic.
#[derive(Default)]
pub struct MockService {
    results: HashMap<String, Vec<SearchRecord>>,
    export: String,
    pub searches: RefCell<Vec<SearchRequest>>,
    pub exports: RefCell<Vec<Vec<String>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, records: Vec<SearchRecord>) -> Self {
        self.results.insert(query.to_string(), records);
        self
    }

    pub fn with_export(mut self, bibtex: &str) -> Self {
        self.export = bibtex.to_string();
        self
    }

    pub fn export_calls(&self) -> usize {
        self.exports.borrow().len()
    }
}

impl LiteratureService for MockService {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, SourceError> {
        self.searches.borrow_mut().push(request.clone());
        Ok(self.results.get(&request.query).cloned().unwrap_or_default())
    }

    fn export_bibtex(&self, bibcodes: &[String]) -> Result<String, SourceError> {
        self.exports.borrow_mut().push(bibcodes.to_vec());
        Ok(self.export.clone())
    }
}

/// Service that fails every call
pub struct FailingService;

impl LiteratureService for FailingService {
    fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchRecord>, SourceError> {
        Err(SourceError::Unauthorized)
    }

    fn export_bibtex(&self, _bibcodes: &[String]) -> Result<String, SourceError> {
        Err(SourceError::RateLimit)
    }
}

pub fn search_record(
    bibcode: &str,
    title: &str,
    pubdate: &str,
    authors: &[&str],
    affs: &[&str],
) -> SearchRecord {
    SearchRecord {
        bibcode: bibcode.to_string(),
        author: authors.iter().map(|s| s.to_string()).collect(),
        aff: affs.iter().map(|s| s.to_string()).collect(),
        title: vec![title.to_string()],
        pubdate: pubdate.to_string(),
        first_author: authors.first().map(|s| s.to_string()).unwrap_or_default(),
    }
}

pub const SMITH_QUERY: &str = r#"=author:"Smith, J*""#;
pub const DOE_QUERY: &str = r#"=author:"Doe, A*""#;
