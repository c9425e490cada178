//! Configuration for publist
//!
//! Every constant set the pipeline relies on (institution fragments,
//! excluded proceedings, query constraints, ...) lives here with its default,
//! so a deployment for another organization only needs a TOML file.
//!
//! ```toml
//! [affiliation]
//! institutions = ["stanford", "slac"]
//! collaborations = ["planck", "fermi"]
//!
//! [query.constraints]
//! pubdate = '["2015-09-00" TO "2016-08-99"]'
//!
//! [output]
//! encoding = "ascii"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::{default_tex_substitutions, TargetEncoding};

/// Fields every search must request for the matcher and store to work
pub const REQUIRED_FIELDS: &[&str] = &["author", "aff", "bibcode", "title", "pubdate", "first_author"];

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// System-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublistConfig {
    pub affiliation: AffiliationConfig,
    pub filter: FilterConfig,
    pub query: QueryConfig,
    pub ads: AdsConfig,
    pub output: OutputConfig,
    pub roster: RosterConfig,
}

/// What counts as "affiliated with the organization"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliationConfig {
    /// Case-insensitive fragments of the organization's affiliation strings
    pub institutions: BTreeSet<String>,
    /// Collaborations whose papers count without per-author affiliation
    pub collaborations: BTreeSet<String>,
    /// Journal codes whose records often lack affiliations; matches there
    /// need manual verification
    pub journals_without_affiliation: BTreeSet<String>,
}

impl Default for AffiliationConfig {
    fn default() -> Self {
        Self {
            institutions: string_set(&[
                "stanford",
                "slac",
                "kipac",
                "kavli institute for particle astrophysics and cosmology",
            ]),
            collaborations: string_set(&["planck", "fermi", "bicep2", "des"]),
            journals_without_affiliation: string_set(&["arXiv", "Sci", "ARNPS", "PNAS", "PhPro", "SPIE"]),
        }
    }
}

/// Which search results are dropped before matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Journal codes of conference abstracts and similar non-papers
    pub excluded_proceedings: BTreeSet<String>,
    /// Title prefixes that mark non-papers
    pub excluded_titles: Vec<String>,
    /// Manual corrections for records whose affiliation list is offset from
    /// the author list, keyed by bibcode
    pub affiliation_shifts: BTreeMap<String, i64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_proceedings: string_set(&[
                "AAS", "APS", "IAUS", "IAUGA", "TESS", "AGUFM", "DPS", "atnf", "hst", "mgm", "tybp",
            ]),
            excluded_titles: vec!["Erratum".to_string(), "Corrigendum".to_string()],
            affiliation_shifts: BTreeMap::from([("2015ApJ...806..206A".to_string(), 1)]),
        }
    }
}

/// How member queries are sent to the search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Extra `field:value` terms appended to every query
    pub constraints: BTreeMap<String, String>,
    /// Field list requested from the service
    pub fields: Vec<String>,
    /// Page size
    pub rows: u32,
    /// Upper bound on pages fetched per query
    pub max_pages: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            constraints: BTreeMap::from([
                ("pubdate".to_string(), r#"["2014-09-00" TO "2015-08-99"]"#.to_string()),
                ("database".to_string(), r#"("astronomy" OR "physics")"#.to_string()),
            ]),
            fields: REQUIRED_FIELDS.iter().map(|s| s.to_string()).collect(),
            rows: 200,
            max_pages: 5,
        }
    }
}

/// ADS API access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    pub base_url: String,
    /// Used only when no token is found in the environment or `~/.ads/dev_key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.adsabs.harvard.edu/v1".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Encoding every rendered line must fit into
    pub encoding: TargetEncoding,
    /// Single-character keys mapped to their replacement text
    pub substitutions: BTreeMap<String, String>,
    /// Member key to printed name, for members whose key is not how they
    /// want to appear
    pub name_replacements: BTreeMap<String, String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            encoding: TargetEncoding::default(),
            substitutions: default_tex_substitutions(),
            name_replacements: BTreeMap::new(),
        }
    }
}

/// Where the membership roster comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RosterConfig {
    /// `http(s)://` URL of a CSV export, or a local path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PublistConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `{config_dir}/publist/config.toml`
    pub fn standard_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("publist").join("config.toml"))
    }

    /// Load from the standard location, falling back to defaults when absent
    pub fn load_standard() -> Result<Self, ConfigError> {
        match Self::standard_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.rows == 0 {
            return Err(ConfigError::OutOfRange("query.rows must be positive".to_string()));
        }
        if self.query.max_pages == 0 {
            return Err(ConfigError::OutOfRange(
                "query.max_pages must be positive".to_string(),
            ));
        }
        if self.ads.timeout_secs == 0 {
            return Err(ConfigError::OutOfRange(
                "ads.timeout_secs must be positive".to_string(),
            ));
        }

        for field in REQUIRED_FIELDS {
            if !self.query.fields.iter().any(|f| f == field) {
                return Err(ConfigError::MissingField(format!("query.fields: {}", field)));
            }
        }

        if let Some(key) = self
            .output
            .substitutions
            .keys()
            .find(|k| k.chars().count() != 1)
        {
            return Err(ConfigError::Invalid(format!(
                "output.substitutions key '{}' must be a single character",
                key
            )));
        }

        Ok(())
    }
}

/// Configuration loading or validation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid TOML: {0}")]
    Parse(String),

    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Required field is missing
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}
