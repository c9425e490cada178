//! NASA ADS (Astrophysics Data System) client
//!
//! API docs: https://ui.adsabs.harvard.edu/help/api/
//! Rate limit: 5000 requests/day, 5 requests/second burst

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::traits::{LiteratureService, SearchRecord, SearchRequest, SourceError};
use crate::config::AdsConfig;
use crate::http::{self, HttpClient, HttpError};

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["ADS_API_TOKEN", "ADS_DEV_KEY"];

/// ADS API response wrapper
#[derive(Debug, Deserialize)]
struct ADSResponse {
    response: ADSResponseBody,
}

#[derive(Debug, Deserialize)]
struct ADSResponseBody {
    docs: Vec<SearchRecord>,
    #[serde(rename = "numFound", default)]
    num_found: u64,
}

/// ADS BibTeX export response
#[derive(Debug, Deserialize)]
struct ADSExportResponse {
    export: String,
}

/// One page of search results
#[derive(Debug)]
pub struct SearchPage {
    pub docs: Vec<SearchRecord>,
    pub num_found: u64,
}

pub struct AdsClient {
    client: HttpClient,
    base_url: String,
}

impl AdsClient {
    /// Build a client, resolving the token from the environment first and
    /// the config last
    pub fn new(config: &AdsConfig) -> Result<Self, SourceError> {
        let token = resolve_token(config).ok_or(SourceError::MissingToken)?;
        Self::with_token(&config.base_url, &token, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_token(base_url: &str, token: &str, timeout: Duration) -> Result<Self, SourceError> {
        Url::parse(base_url).map_err(|_| HttpError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        let client = HttpClient::new("publist/0.1 (+https://ui.adsabs.harvard.edu)", timeout)?
            .with_bearer_token(token);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Parse ADS JSON search response
    pub fn parse_search_response(json: &str) -> Result<SearchPage, SourceError> {
        let response: ADSResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid ADS JSON: {}", e)))?;

        Ok(SearchPage {
            docs: response.response.docs,
            num_found: response.response.num_found,
        })
    }

    /// Parse BibTeX export response
    pub fn parse_bibtex_export(json: &str) -> Result<String, SourceError> {
        let response: ADSExportResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid export response: {}", e)))?;
        Ok(response.export)
    }

    fn fetch_page(&self, request: &SearchRequest, start: u64) -> Result<SearchPage, SourceError> {
        let q = request.full_query();
        let fl = request.fields.join(",");
        let rows = request.rows.to_string();
        let start = start.to_string();
        let url = format!("{}/search/query", self.base_url);

        let response = http::block_on(self.client.get_with_params(
            &url,
            &[
                ("q", q.as_str()),
                ("fl", fl.as_str()),
                ("rows", rows.as_str()),
                ("start", start.as_str()),
            ],
        ))??
        .error_for_status()?;

        Self::parse_search_response(&response.body)
    }
}

impl LiteratureService for AdsClient {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, SourceError> {
        if request.query.trim().is_empty() {
            return Err(SourceError::InvalidQuery("empty query".to_string()));
        }

        let mut records = Vec::new();
        for page in 0..request.max_pages {
            let start = u64::from(page) * u64::from(request.rows);
            let SearchPage { docs, num_found } = self.fetch_page(request, start)?;
            let fetched = docs.len();
            records.extend(docs);

            debug!(
                query = %request.query,
                page,
                fetched,
                num_found,
                "ADS search page"
            );

            if fetched < request.rows as usize || records.len() as u64 >= num_found {
                break;
            }
        }

        Ok(records)
    }

    fn export_bibtex(&self, bibcodes: &[String]) -> Result<String, SourceError> {
        let url = format!("{}/export/bibtex", self.base_url);
        let body = serde_json::json!({ "bibcode": bibcodes });

        let response = http::block_on(self.client.post_json(&url, &body))??.error_for_status()?;

        Self::parse_bibtex_export(&response.body)
    }
}

/// Find an API token: environment, then `~/.ads/dev_key`, then the config
pub fn resolve_token(config: &AdsConfig) -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(dev_key_path().and_then(|p| std::fs::read_to_string(p).ok()))
        .chain(config.token.clone())
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

fn dev_key_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ads").join("dev_key"))
}
