//! Author-line formatting
//!
//! Only tracked members are named in full; everyone else is folded into the
//! first author and "et al.".

use std::collections::BTreeMap;

use super::{AuthorFormat, NameFormatter};
use crate::articles::ArticleRecord;

pub struct AuthorsFormatter<N> {
    name_formatter: N,
    name_replacements: BTreeMap<String, String>,
}

impl<N: NameFormatter> AuthorsFormatter<N> {
    pub fn new(name_formatter: N) -> Self {
        Self {
            name_formatter,
            name_replacements: BTreeMap::new(),
        }
    }

    /// Print members under a different name than their key
    pub fn with_replacements(mut self, replacements: BTreeMap<String, String>) -> Self {
        self.name_replacements = replacements;
        self
    }

    fn format_name(&self, key: &str) -> String {
        let name = self
            .name_replacements
            .get(key)
            .map(String::as_str)
            .unwrap_or(key);
        self.name_formatter.format_name(name)
    }
}

impl<N: NameFormatter> AuthorFormat for AuthorsFormatter<N> {
    fn format_authors(&self, record: &ArticleRecord) -> String {
        let names: Vec<String> = record
            .members_by_position()
            .into_iter()
            .map(|(key, _)| self.format_name(key))
            .collect();
        let member_count = names.len();
        let members = names.join(", ");

        if record.first_author_is_member() {
            if member_count == record.author_count {
                members
            } else if member_count == 1 {
                format!("{} et al", members)
            } else {
                format!("{} et al., with {}", names[0], names[1..].join(", "))
            }
        } else {
            let first_author = record
                .first_author
                .split(',')
                .next()
                .unwrap_or_default();
            if record.author_count == member_count + 1 {
                format!("{}, {}", first_author, members)
            } else if first_author.to_lowercase().contains("collaboration") {
                format!("{}, with {}", first_author, members)
            } else {
                format!("{} et al., with {}", first_author, members)
            }
        }
    }
}
