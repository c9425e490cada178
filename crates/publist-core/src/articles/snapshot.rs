//! Snapshot files
//!
//! Records and the bibliography cache are written together, so they can
//! never drift apart on disk. Layout: a bincode envelope carrying a magic
//! tag and format version ahead of the payload. The version is checked
//! before the payload is trusted.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use publist_bibtex::BibTeXEntry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::ArticleRecord;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"PBLS";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Not a publist snapshot")]
    BadMagic,

    #[error("Snapshot format version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a store persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: BTreeMap<String, ArticleRecord>,
    pub bibliography: BTreeMap<String, BibTeXEntry>,
}

/// Only the header, so a version mismatch is reported before the payload
/// (whose shape may have changed) is decoded
#[derive(Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u32,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    magic: [u8; 4],
    version: u32,
    payload: &'a Snapshot,
}

#[derive(Deserialize)]
struct Envelope {
    #[allow(dead_code)]
    magic: [u8; 4],
    #[allow(dead_code)]
    version: u32,
    payload: Snapshot,
}

impl Snapshot {
    /// Write to `path` through a temporary sibling, then rename into place
    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let tmp = temp_path(path);
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            bincode::serialize_into(
                &mut writer,
                &EnvelopeRef {
                    magic: SNAPSHOT_MAGIC,
                    version: SNAPSHOT_VERSION,
                    payload: self,
                },
            )
            .map_err(|e| SnapshotError::Encode(e.to_string()))?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let header: Header =
            bincode::deserialize(bytes).map_err(|_| SnapshotError::BadMagic)?;
        if header.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        if header.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: header.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let envelope: Envelope =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        Ok(envelope.payload)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(&EnvelopeRef {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            payload: self,
        })
        .map_err(|e| SnapshotError::Encode(e.to_string()))
    }
}

/// `path` with `.tmp` appended to the full file name
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.records.insert(
            "2015ApJ...806..206A".to_string(),
            ArticleRecord {
                bibcode: "2015ApJ...806..206A".to_string(),
                first_author: "Abbott, T.".to_string(),
                author_count: 3,
                title: "The Dark Energy Survey".to_string(),
                publication_date: "2015-06".to_string(),
                member_index_map: [("smith".to_string(), 2)].into(),
                pending_verification: ["smith".to_string()].into(),
            },
        );
        snapshot.bibliography.insert(
            "2015ApJ...806..206A".to_string(),
            BibTeXEntry::new("2015ApJ...806..206A", "article").with_field("doi", "10.1/x"),
        );
        snapshot
    }

    #[test]
    fn test_bytes_round_trip() {
        let snapshot = sample();
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"PBLS");
        assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_file_round_trip_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.snapshot");
        sample().write(&path).unwrap();

        assert_eq!(Snapshot::read(&path).unwrap(), sample());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_write_keeps_neighbouring_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("publist.snapshot");
        let neighbour = dir.path().join("publist.tmp");
        fs::write(&neighbour, "unrelated").unwrap();

        sample().write(&path).unwrap();

        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "unrelated");
        assert_eq!(temp_path(&path), dir.path().join("publist.snapshot.tmp"));
        assert_eq!(Snapshot::read(&path).unwrap(), sample());
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = sample().to_bytes().unwrap();
        // bincode writes the u32 version little-endian right after the magic
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            Snapshot::from_bytes(&bytes),
            Err(SnapshotError::VersionMismatch { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn test_bad_magic() {
        assert!(matches!(
            Snapshot::from_bytes(b"not a snapshot at all"),
            Err(SnapshotError::BadMagic)
        ));
        assert!(matches!(Snapshot::from_bytes(b""), Err(SnapshotError::BadMagic)));
    }
}
