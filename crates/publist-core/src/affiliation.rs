//! Affiliation matching
//!
//! Decides whether the author at a given position of a search record belongs
//! to the tracked organization. Affiliation strings are free text and often
//! missing on large-collaboration papers, so the answer is three-valued:
//! unambiguous matches are accepted, genuinely uncertain ones are flagged for
//! a human instead of being silently included or dropped.

use std::collections::BTreeSet;

use crate::config::AffiliationConfig;
use crate::sources::SearchRecord;

/// Placeholder ADS uses for an author without affiliation data
pub const NO_AFFILIATION: &str = "-";

/// Outcome of an affiliation check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Confirmed,
    Rejected,
    /// Plausible, but the record carries no affiliation to confirm it
    NeedsVerification,
}

impl Verdict {
    /// Whether the author position should be accepted at all
    pub fn is_match(self) -> bool {
        !matches!(self, Verdict::Rejected)
    }
}

#[derive(Debug, Clone)]
pub struct AffiliationMatcher {
    institutions: Vec<String>,
    collaborations: Vec<String>,
    journals_without_affiliation: BTreeSet<String>,
}

impl AffiliationMatcher {
    pub fn new(config: &AffiliationConfig) -> Self {
        Self {
            institutions: config.institutions.iter().map(|s| s.to_lowercase()).collect(),
            collaborations: config.collaborations.iter().map(|s| s.to_lowercase()).collect(),
            journals_without_affiliation: config.journals_without_affiliation.clone(),
        }
    }

    /// Check the author at `author_index`
    ///
    /// An index past the end of the affiliation list is treated as missing
    /// affiliation data.
    pub fn check(&self, record: &SearchRecord, author_index: usize) -> Verdict {
        let aff = record
            .aff
            .get(author_index)
            .map(|a| a.to_lowercase())
            .unwrap_or_else(|| NO_AFFILIATION.to_string());

        if aff == NO_AFFILIATION {
            return self.check_unaffiliated(record);
        }

        if self.institutions.iter().any(|inst| aff.contains(inst.as_str())) {
            Verdict::Confirmed
        } else {
            Verdict::Rejected
        }
    }

    /// Verdict for an author with no affiliation data
    ///
    /// Collaboration papers are trusted by name; journals known to omit
    /// affiliations need a human to look.
    pub fn check_unaffiliated(&self, record: &SearchRecord) -> Verdict {
        let first_author = record
            .author
            .first()
            .map(|a| a.to_lowercase())
            .unwrap_or_default();

        if first_author.contains("collaboration")
            && self
                .collaborations
                .iter()
                .any(|c| first_author.contains(c.as_str()))
        {
            Verdict::Confirmed
        } else if self.journals_without_affiliation.contains(record.journal()) {
            Verdict::NeedsVerification
        } else {
            Verdict::Rejected
        }
    }
}

impl Default for AffiliationMatcher {
    fn default() -> Self {
        Self::new(&AffiliationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn record(bibcode: &str, authors: &[&str], affs: &[&str]) -> SearchRecord {
        SearchRecord {
            bibcode: bibcode.to_string(),
            author: authors.iter().map(|s| s.to_string()).collect(),
            aff: affs.iter().map(|s| s.to_string()).collect(),
            title: vec!["A Study".to_string()],
            pubdate: "2015-01-00".to_string(),
            first_author: authors.first().map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    #[rstest]
    #[case::institution("Stanford University", Verdict::Confirmed)]
    #[case::case_insensitive("KIPAC, SLAC National Accelerator Laboratory", Verdict::Confirmed)]
    #[case::long_name("Kavli Institute for Particle Astrophysics and Cosmology", Verdict::Confirmed)]
    #[case::other("Harvard University", Verdict::Rejected)]
    #[case::empty_string("", Verdict::Rejected)]
    fn test_direct_affiliation(#[case] aff: &str, #[case] expected: Verdict) {
        let matcher = AffiliationMatcher::default();
        let rec = record("2015ApJ...1234S", &["Smith, J.", "Doe, A."], &[aff, "-"]);
        assert_eq!(matcher.check(&rec, 0), expected);
    }

    #[rstest]
    #[case::known_collaboration("2015A&A...577A..42P", "Planck Collaboration", Verdict::Confirmed)]
    #[case::unknown_collaboration("2015A&A...577A..42P", "LSST Collaboration", Verdict::Rejected)]
    #[case::collab_name_without_word("2015A&A...577A..42P", "Planck, A.", Verdict::Rejected)]
    #[case::arxiv("2015arXiv150201111T", "Smith, J.", Verdict::NeedsVerification)]
    #[case::science("2015Sci...347..123S", "Smith, J.", Verdict::NeedsVerification)]
    #[case::spie("2014SPIE.9145E..0AB", "Smith, J.", Verdict::NeedsVerification)]
    #[case::regular_journal("2015ApJ...806..206A", "Smith, J.", Verdict::Rejected)]
    fn test_missing_affiliation(
        #[case] bibcode: &str,
        #[case] first_author: &str,
        #[case] expected: Verdict,
    ) {
        let matcher = AffiliationMatcher::default();
        let rec = record(bibcode, &[first_author, "Smith, J."], &["-", "-"]);
        assert_eq!(matcher.check(&rec, 1), expected);
    }

    #[test]
    fn test_out_of_range_index_means_no_affiliation() {
        let matcher = AffiliationMatcher::default();
        let rec = record("2015arXiv150201111T", &["Smith, J.", "Doe, A."], &["Stanford"]);
        assert_eq!(matcher.check(&rec, 1), Verdict::NeedsVerification);
        assert_eq!(matcher.check(&rec, 100), Verdict::NeedsVerification);
    }

    #[test]
    fn test_configured_sets_are_case_folded() {
        let config = AffiliationConfig {
            institutions: ["CALTECH".to_string()].into(),
            collaborations: ["LIGO".to_string()].into(),
            journals_without_affiliation: BTreeSet::new(),
        };
        let matcher = AffiliationMatcher::new(&config);

        let rec = record("2016PhRvL.116f1102A", &["Doe, A."], &["Caltech"]);
        assert_eq!(matcher.check(&rec, 0), Verdict::Confirmed);

        let rec = record("2016PhRvL.116f1102A", &["LIGO Scientific Collaboration"], &["-"]);
        assert_eq!(matcher.check(&rec, 0), Verdict::Confirmed);
    }

    #[test]
    fn test_verdict_is_match() {
        assert!(Verdict::Confirmed.is_match());
        assert!(Verdict::NeedsVerification.is_match());
        assert!(!Verdict::Rejected.is_match());
    }

    fn affiliation() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(NO_AFFILIATION.to_string()),
            Just("Stanford University".to_string()),
            Just(String::new()),
            "[A-Za-z ,]{0,30}",
        ]
    }

    proptest! {
        #[test]
        fn test_check_is_deterministic(
            journal in prop::sample::select(vec!["arXiv", "ApJ..", "Sci..", "MNRAS"]),
            first_author in prop::sample::select(vec!["Planck Collaboration", "Smith, J.", "DES Collaboration"]),
            affs in prop::collection::vec(affiliation(), 0..6),
            index in 0usize..8,
        ) {
            let bibcode = format!("2015{}.123..456X", journal);
            let rec = record(&bibcode, &[first_author, "Doe, A."], &[]);
            let rec = SearchRecord { aff: affs, ..rec };

            let matcher = AffiliationMatcher::default();
            let first = matcher.check(&rec, index);
            prop_assert_eq!(first, matcher.check(&rec, index));
            prop_assert_eq!(first, AffiliationMatcher::default().check(&rec.clone(), index));
        }
    }
}
