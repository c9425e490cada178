//! Error types for publist-core

use thiserror::Error;

use crate::articles::SnapshotError;
use crate::config::ConfigError;
use crate::sources::SourceError;

/// Result type alias for publist operations
pub type Result<T> = std::result::Result<T, PublistError>;

/// Main error type for publist operations
#[derive(Error, Debug)]
pub enum PublistError {
    /// Query service, bulk export or HTTP failures, passed through untouched
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Member registration and lookup
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Malformed roster data
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// Snapshot load/save
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Configuration loading and validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Member registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `add` refuses to overwrite; use `update` for that
    #[error("Member already registered: {0}")]
    Duplicate(String),

    #[error("Member not found: {0}")]
    NotFound(String),
}

/// Roster ingestion errors
///
/// These indicate misconfigured roster data and are not recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// A `first` column lists name variants starting with different letters
    #[error("Inconsistent first-name initials for {member}: {first}")]
    InconsistentInitials { member: String, first: String },

    #[error("Row {row}: missing value for column '{column}'")]
    MissingField { row: usize, column: &'static str },

    #[error("Invalid CSV: {0}")]
    Csv(String),
}

impl From<csv::Error> for RosterError {
    fn from(e: csv::Error) -> Self {
        RosterError::Csv(e.to_string())
    }
}
