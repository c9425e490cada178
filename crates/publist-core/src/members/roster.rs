//! Roster ingestion
//!
//! The roster is a CSV export (typically of a shared spreadsheet) with at
//! least the columns `name, print, last, first, manual_add`:
//!
//! ```csv
//! name,print,last,first,manual_add
//! Jane Smith,,Smith,J.;Jane,
//! Ana Lopez-Diaz,A. López-Díaz,Lopez-Diaz,A.,2015arXiv150201111L
//! ```
//!
//! `first` lists `;`-separated name variants, each producing one author
//! query; `manual_add` lists bibcodes the author search misses.

use std::fs::File;
use std::io::Read;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use url::Url;

use super::MemberRegistry;
use crate::error::{Result, RosterError};
use crate::http::{self, HttpClient};
use crate::sources::SourceError;

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    print: String,
    #[serde(default)]
    last: String,
    #[serde(default)]
    first: String,
    #[serde(default)]
    manual_add: String,
}

/// Everything `MemberRegistry::add` needs for one row
struct NewMember {
    key: String,
    display_name: String,
    last_name: String,
    first_initial: String,
    queries: Vec<String>,
}

impl RosterRow {
    fn into_new_member(self, row: usize) -> std::result::Result<NewMember, RosterError> {
        let require = |value: &str, column: &'static str| {
            if value.is_empty() {
                Err(RosterError::MissingField { row, column })
            } else {
                Ok(())
            }
        };
        require(&self.name, "name")?;
        require(&self.last, "last")?;
        require(&self.first, "first")?;

        let last_name = self.last.replace('-', " ");
        let initial = self.first.chars().next();
        let firsts: Vec<&str> = self.first.split(';').map(str::trim).collect();

        if firsts.iter().any(|f| f.chars().next() != initial) {
            return Err(RosterError::InconsistentInitials {
                member: self.name,
                first: self.first,
            });
        }

        let mut queries: Vec<String> = firsts
            .iter()
            .map(|first| format!("=author:\"{}, {}\"", last_name, first.replace('.', "*")))
            .collect();
        queries.extend(
            self.manual_add
                .split(';')
                .map(str::trim)
                .filter(|bibcode| !bibcode.is_empty())
                .map(|bibcode| format!("bibcode:{}", bibcode)),
        );

        let display_name = if self.print.is_empty() {
            self.name.clone()
        } else {
            self.print
        };

        Ok(NewMember {
            key: self.name,
            display_name,
            last_name,
            first_initial: initial.map(String::from).unwrap_or_default(),
            queries,
        })
    }
}

/// Build a registry from roster CSV
///
/// Malformed rows and duplicate names abort the whole load.
pub fn load_roster<R: Read>(reader: R) -> Result<MemberRegistry> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut registry = MemberRegistry::new();
    for (i, row) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(RosterError::from)?;
        let new = row.into_new_member(i + 1)?;
        registry.add(
            &new.key,
            &new.display_name,
            &new.last_name,
            &new.first_initial,
            new.queries,
        )?;
    }

    info!(members = registry.len(), "Loaded roster");
    Ok(registry)
}

pub fn load_roster_str(csv_text: &str) -> Result<MemberRegistry> {
    load_roster(csv_text.as_bytes())
}

/// Load the roster from an `http(s)://` URL or a local path
pub fn fetch_roster(source: &str, timeout: Duration) -> Result<MemberRegistry> {
    let remote = Url::parse(source)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);

    if remote {
        let client = HttpClient::new("publist/0.1", timeout).map_err(SourceError::from)?;
        let response = http::block_on(client.get(source))
            .and_then(|r| r)
            .and_then(|r| r.error_for_status())
            .map_err(SourceError::from)?;
        load_roster_str(&response.body)
    } else {
        load_roster(File::open(source)?)
    }
}
