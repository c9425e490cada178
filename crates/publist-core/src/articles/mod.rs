//! Article aggregation
//!
//! [`ArticleStore`] runs every member's queries, keeps the records in which
//! at least one member was matched as an author, tracks which matches still
//! need a human to confirm them, and renders the final publication list.

mod record;
mod snapshot;

pub use record::{ArticleRecord, VerificationItem};
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use publist_bibtex::{entries_by_key, BibTeXEntry};
use tracing::{debug, info, warn};

use crate::affiliation::{AffiliationMatcher, Verdict};
use crate::bibcode;
use crate::config::{FilterConfig, PublistConfig, QueryConfig};
use crate::format::{AuthorFormat, EntryFormat, Transcoder};
use crate::members::Member;
use crate::sources::{LiteratureService, SearchRecord, SearchRequest, SourceError};

/// Exported BibTeX keyed by bibcode
pub type BibliographyCache = BTreeMap<String, BibTeXEntry>;

#[derive(Debug, Clone)]
pub struct ArticleStore {
    filter: FilterConfig,
    query: QueryConfig,
    matcher: AffiliationMatcher,
    transcoder: Transcoder,
    records: BTreeMap<String, ArticleRecord>,
    bibliography: BibliographyCache,
}

impl ArticleStore {
    pub fn new(config: &PublistConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            query: config.query.clone(),
            matcher: AffiliationMatcher::new(&config.affiliation),
            transcoder: Transcoder::new(config.output.encoding, &config.output.substitutions),
            records: BTreeMap::new(),
            bibliography: BTreeMap::new(),
        }
    }

    /// Replace the output transcoder
    pub fn with_transcoder(mut self, transcoder: Transcoder) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Run all of `member`'s queries and fold the matches into the store
    ///
    /// Returns the number of (record, member) matches made, counting a record
    /// again when several queries return it.
    pub fn add<S: LiteratureService + ?Sized>(
        &mut self,
        member: &Member,
        service: &S,
    ) -> Result<usize, SourceError> {
        let mut count = 0;

        for query in &member.search_queries {
            let request = SearchRequest {
                query: query.clone(),
                fields: self.query.fields.clone(),
                constraints: self.query.constraints.clone(),
                rows: self.query.rows,
                max_pages: self.query.max_pages,
            };
            let results = service.search(&request)?;
            let returned = results.len();
            let mut matched = 0;

            for entry in &results {
                if let Some(reason) = self.exclusion_reason(entry) {
                    debug!(bibcode = %entry.bibcode, reason, "Skipping record");
                    continue;
                }

                let Some((position, verdict)) = self.find_member(member, entry) else {
                    continue;
                };

                self.records
                    .entry(entry.bibcode.clone())
                    .or_insert_with(|| ArticleRecord::from_search(entry))
                    .record_member(&member.key, position, verdict);
                matched += 1;
            }

            info!(member = %member.key, query = %query, returned, matched, "Query done");
            count += matched;
        }

        Ok(count)
    }

    fn exclusion_reason(&self, entry: &SearchRecord) -> Option<&'static str> {
        let title = entry.title();
        if self
            .filter
            .excluded_titles
            .iter()
            .any(|prefix| title.starts_with(prefix.as_str()))
        {
            Some("excluded title")
        } else if self.filter.excluded_proceedings.contains(entry.journal()) {
            Some("excluded proceedings")
        } else {
            None
        }
    }

    /// First author position that is `member` with an acceptable affiliation
    fn find_member(&self, member: &Member, entry: &SearchRecord) -> Option<(usize, Verdict)> {
        let shift = self
            .filter
            .affiliation_shifts
            .get(&entry.bibcode)
            .copied()
            .unwrap_or(0);

        entry
            .author
            .iter()
            .enumerate()
            .filter(|(_, author)| member.matches_author(author))
            .map(|(position, _)| {
                let verdict = match shifted_index(position, shift) {
                    Some(index) => self.matcher.check(entry, index),
                    None => self.matcher.check_unaffiliated(entry),
                };
                (position, verdict)
            })
            .find(|(_, verdict)| verdict.is_match())
    }

    /// Delete exactly the given records; unknown ids are ignored
    ///
    /// Takes any collection of ids. Pass a single id as `[id]` or `Some(id)`.
    /// Returns how many records were removed.
    pub fn remove<I, S>(&mut self, bibcodes: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        bibcodes
            .into_iter()
            .filter(|bibcode| self.records.remove(bibcode.as_ref()).is_some())
            .count()
    }

    /// Mark the given records as manually confirmed
    ///
    /// Like [`remove`](Self::remove), a single id is passed as `[id]`.
    pub fn white_list<I, S>(&mut self, bibcodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for bibcode in bibcodes {
            if let Some(record) = self.records.get_mut(bibcode.as_ref()) {
                record.pending_verification.clear();
            }
        }
    }

    /// Confirm records where at least `min_member_number` members are pending
    ///
    /// Several independent member matches on one paper are taken as
    /// confirmation of each other. Returns how many records were confirmed.
    pub fn whiten_member_collab(&mut self, min_member_number: usize) -> usize {
        let mut whitened = 0;
        for record in self.records.values_mut() {
            if record.needs_verification()
                && record.pending_verification.len() >= min_member_number
            {
                record.pending_verification.clear();
                whitened += 1;
            }
        }
        whitened
    }

    /// Worklist of records with unconfirmed member matches
    pub fn get_require_verification(&self) -> Vec<VerificationItem> {
        self.records
            .values()
            .filter(|record| record.needs_verification())
            .map(VerificationItem::from)
            .collect()
    }

    /// Number of records, optionally only arXiv e-prints
    pub fn count(&self, arxiv_only: bool) -> usize {
        if arxiv_only {
            self.records.keys().filter(|k| bibcode::is_arxiv(k)).count()
        } else {
            self.records.len()
        }
    }

    pub fn bibcodes(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    pub fn get(&self, bibcode: &str) -> Option<&ArticleRecord> {
        self.records.get(bibcode)
    }

    pub fn records(&self) -> &BTreeMap<String, ArticleRecord> {
        &self.records
    }

    pub fn bibliography(&self) -> &BibliographyCache {
        &self.bibliography
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Persist records and bibliography together
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = Snapshot {
            records: self.records.clone(),
            bibliography: self.bibliography.clone(),
        };
        snapshot.write(path)?;
        info!(
            path = %path.display(),
            records = self.records.len(),
            bibliography = self.bibliography.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    /// Load a snapshot; `merge` overlays it onto the current state (loaded
    /// entries win), otherwise it replaces the state
    pub fn load(&mut self, path: &Path, merge: bool) -> Result<(), SnapshotError> {
        let snapshot = Snapshot::read(path)?;
        info!(
            path = %path.display(),
            records = snapshot.records.len(),
            merge,
            "Loaded snapshot"
        );

        if merge {
            self.records.extend(snapshot.records);
            self.bibliography.extend(snapshot.bibliography);
        } else {
            self.records = snapshot.records;
            self.bibliography = snapshot.bibliography;
        }
        Ok(())
    }

    /// Records with no BibTeX in the bibliography yet
    pub fn missing_bibliography(&self) -> Vec<&str> {
        self.records
            .keys()
            .filter(|k| !self.bibliography.contains_key(*k))
            .map(String::as_str)
            .collect()
    }

    /// Fetch BibTeX for every record not yet in the bibliography
    ///
    /// One export call covers all missing records. Returns how many entries
    /// were added.
    pub fn update_bibliography<S: LiteratureService + ?Sized>(
        &mut self,
        service: &S,
    ) -> Result<usize, SourceError> {
        let missing: BTreeSet<String> = self
            .missing_bibliography()
            .into_iter()
            .map(String::from)
            .collect();
        if missing.is_empty() {
            return Ok(0);
        }

        let requested: Vec<String> = missing.iter().cloned().collect();
        let export = service.export_bibtex(&requested)?;
        let mut added = 0;
        for (key, entry) in entries_by_key(&export) {
            if missing.contains(&key) {
                self.bibliography.insert(key, entry);
                added += 1;
            }
        }

        if added < missing.len() {
            let still_missing: Vec<&String> = missing
                .iter()
                .filter(|k| !self.bibliography.contains_key(*k))
                .collect();
            warn!(?still_missing, "Export did not return every requested record");
        }
        Ok(added)
    }

    /// Records ordered by publication date, oldest first
    ///
    /// The sort is stable, so records from the same month stay in bibcode
    /// order.
    pub fn records_by_date(&self) -> Vec<&ArticleRecord> {
        let mut records: Vec<&ArticleRecord> = self.records.values().collect();
        records.sort_by(|a, b| a.publication_date.cmp(&b.publication_date));
        records
    }

    /// Render the publication list, oldest first
    pub fn generate_formatted_output<S, A, E>(
        &mut self,
        service: &S,
        authors_formatter: &A,
        entry_formatter: &E,
    ) -> Result<Vec<String>, SourceError>
    where
        S: LiteratureService + ?Sized,
        A: AuthorFormat + ?Sized,
        E: EntryFormat + ?Sized,
    {
        self.update_bibliography(service)?;
        Ok(self.render(authors_formatter, entry_formatter))
    }

    /// Render from the current bibliography without contacting the service
    pub fn render<A, E>(&self, authors_formatter: &A, entry_formatter: &E) -> Vec<String>
    where
        A: AuthorFormat + ?Sized,
        E: EntryFormat + ?Sized,
    {
        self.records_by_date()
            .into_iter()
            .map(|record| {
                let authors = authors_formatter.format_authors(record);
                let line = entry_formatter.render(&self.bibliography, record, &authors);
                self.transcoder.apply(line)
            })
            .collect()
    }
}

impl Default for ArticleStore {
    fn default() -> Self {
        Self::new(&PublistConfig::default())
    }
}

/// `position + shift`, or `None` when that falls before the first author
fn shifted_index(position: usize, shift: i64) -> Option<usize> {
    i64::try_from(position)
        .ok()
        .and_then(|p| p.checked_add(shift))
        .and_then(|i| usize::try_from(i).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_index() {
        assert_eq!(shifted_index(0, 0), Some(0));
        assert_eq!(shifted_index(3, 1), Some(4));
        assert_eq!(shifted_index(1, -1), Some(0));
        assert_eq!(shifted_index(0, -1), None);
    }

    #[test]
    fn test_remove_only_named_records() {
        let mut store = ArticleStore::default();
        for bibcode in ["2015ApJ...806..206A", "2015arXiv150201111T", "2014SPIE.9145E..0AB"] {
            store.records.insert(
                bibcode.to_string(),
                ArticleRecord::from_search(&SearchRecord {
                    bibcode: bibcode.to_string(),
                    ..Default::default()
                }),
            );
        }

        assert_eq!(store.remove(["2015arXiv150201111T", "1999nope.......1X"]), 1);
        assert_eq!(store.bibcodes(), ["2014SPIE.9145E..0AB", "2015ApJ...806..206A"]);
        assert_eq!(store.count(true), 0);

        assert_eq!(store.remove(Some("2015ApJ...806..206A")), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_white_list_single_and_many() {
        let mut store = ArticleStore::default();
        for bibcode in ["2015arXiv150201111T", "2015arXiv150300001S"] {
            let mut record = ArticleRecord::from_search(&SearchRecord {
                bibcode: bibcode.to_string(),
                ..Default::default()
            });
            record.record_member("Jane Smith", 1, Verdict::NeedsVerification);
            store.records.insert(bibcode.to_string(), record);
        }

        store.white_list(["2015arXiv150201111T"]);
        assert_eq!(store.get_require_verification().len(), 1);

        let id = String::from("2015arXiv150300001S");
        store.white_list(Some(&id));
        assert!(store.get_require_verification().is_empty());
        assert_eq!(store.remove(vec![id]), 1);
    }
}
