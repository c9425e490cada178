//! Article records kept by the store

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::affiliation::Verdict;
use crate::bibcode;
use crate::sources::SearchRecord;

/// A publication with at least one tracked member among its authors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub bibcode: String,
    pub first_author: String,
    pub author_count: usize,
    pub title: String,
    /// `YYYY-MM`; fixed width, so string order is chronological
    pub publication_date: String,
    /// Member key → zero-based author position
    pub member_index_map: BTreeMap<String, usize>,
    /// Members whose match still needs a human to confirm it
    pub pending_verification: BTreeSet<String>,
}

impl ArticleRecord {
    /// Base metadata from a search result, with no members yet
    pub fn from_search(record: &SearchRecord) -> Self {
        Self {
            bibcode: record.bibcode.clone(),
            first_author: record.first_author.clone(),
            author_count: record.author.len(),
            title: record.title().to_string(),
            publication_date: record.pubdate.chars().take(7).collect(),
            member_index_map: BTreeMap::new(),
            pending_verification: BTreeSet::new(),
        }
    }

    pub fn journal(&self) -> &str {
        bibcode::journal_code(&self.bibcode)
    }

    /// Record that `member` appears at `position`
    ///
    /// A later confirmed match does not clear an earlier pending flag; only
    /// the curation operations do that.
    pub(crate) fn record_member(&mut self, member: &str, position: usize, verdict: Verdict) {
        self.member_index_map.insert(member.to_string(), position);
        if verdict == Verdict::NeedsVerification {
            self.pending_verification.insert(member.to_string());
        }
    }

    /// Matched members ordered by author position
    pub fn members_by_position(&self) -> Vec<(&str, usize)> {
        let mut members: Vec<(&str, usize)> = self
            .member_index_map
            .iter()
            .map(|(key, &position)| (key.as_str(), position))
            .collect();
        members.sort_by_key(|&(_, position)| position);
        members
    }

    /// Whether the first listed author is a tracked member
    pub fn first_author_is_member(&self) -> bool {
        self.member_index_map.values().any(|&position| position == 0)
    }

    pub fn needs_verification(&self) -> bool {
        !self.pending_verification.is_empty()
    }
}

/// One line of the manual verification worklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationItem {
    pub to_verify: BTreeSet<String>,
    pub title: String,
    pub first_author: String,
    pub journal: String,
    pub bibcode: String,
}

impl From<&ArticleRecord> for VerificationItem {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            to_verify: record.pending_verification.clone(),
            title: record.title.clone(),
            first_author: record.first_author.clone(),
            journal: record.journal().to_string(),
            bibcode: record.bibcode.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_record() -> SearchRecord {
        SearchRecord {
            bibcode: "2015ApJ...806..206A".to_string(),
            author: vec!["Abbott, T.".to_string(), "Smith, J.".to_string()],
            aff: vec![],
            title: vec!["The Dark Energy Survey".to_string(), "ignored".to_string()],
            pubdate: "2015-06-00".to_string(),
            first_author: "Abbott, T.".to_string(),
        }
    }

    #[test]
    fn test_from_search() {
        let record = ArticleRecord::from_search(&search_record());
        assert_eq!(record.title, "The Dark Energy Survey");
        assert_eq!(record.publication_date, "2015-06");
        assert_eq!(record.author_count, 2);
        assert_eq!(record.journal(), "ApJ");
        assert!(record.member_index_map.is_empty());
    }

    #[test]
    fn test_record_member_tracks_pending() {
        let mut record = ArticleRecord::from_search(&search_record());
        record.record_member("smith", 1, Verdict::NeedsVerification);
        record.record_member("abbott", 0, Verdict::Confirmed);

        assert!(record.first_author_is_member());
        assert!(record.needs_verification());
        assert_eq!(record.members_by_position(), [("abbott", 0), ("smith", 1)]);

        // A confirmed re-match keeps the pending flag
        record.record_member("smith", 1, Verdict::Confirmed);
        assert!(record.pending_verification.contains("smith"));
    }
}
