//! Tracked members
//!
//! The registry provides:
//! - Registration that refuses silent overwrites (`add`) next to an
//!   explicit overwrite (`update`)
//! - Lookup by key
//! - Iteration in roster order

mod roster;

pub use roster::{fetch_roster, load_roster, load_roster_str};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A tracked member of the organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique id, also the name shown in rendered author lists
    pub key: String,
    pub display_name: String,
    /// `"Last, F"`, matched against ADS author strings
    pub short_name: String,
    /// ADS queries that find this member's papers, run in order
    pub search_queries: Vec<String>,
}

impl Member {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        last_name: &str,
        first_initial: &str,
        search_queries: Vec<String>,
    ) -> Self {
        let initial: String = first_initial.chars().take(1).collect();
        Self {
            key: key.into(),
            display_name: display_name.into(),
            short_name: format!("{}, {}", last_name, initial),
            search_queries,
        }
    }

    /// Whether an ADS author string could be this member
    ///
    /// Hyphens in the author string count as spaces and case is ignored, so
    /// `"Smith-Jones, Jane"` matches a short name of `"Smith Jones, J"`.
    pub fn matches_author(&self, author: &str) -> bool {
        author
            .replace('-', " ")
            .to_lowercase()
            .starts_with(&self.short_name.to_lowercase())
    }
}

/// Roster of tracked members
#[derive(Debug, Default, Clone)]
pub struct MemberRegistry {
    members: Vec<Member>,
    index: HashMap<String, usize>,
}

impl MemberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new member; fails if the key is already taken
    pub fn add(
        &mut self,
        key: &str,
        display_name: &str,
        last_name: &str,
        first_initial: &str,
        search_queries: Vec<String>,
    ) -> Result<&Member, RegistryError> {
        if self.index.contains_key(key) {
            return Err(RegistryError::Duplicate(key.to_string()));
        }
        Ok(self.update(key, display_name, last_name, first_initial, search_queries))
    }

    /// Register or overwrite a member
    pub fn update(
        &mut self,
        key: &str,
        display_name: &str,
        last_name: &str,
        first_initial: &str,
        search_queries: Vec<String>,
    ) -> &Member {
        let member = Member::new(key, display_name, last_name, first_initial, search_queries);
        let slot = match self.index.get(key).copied() {
            Some(slot) => {
                self.members[slot] = member;
                slot
            }
            None => {
                self.members.push(member);
                self.index.insert(key.to_string(), self.members.len() - 1);
                self.members.len() - 1
            }
        };
        &self.members[slot]
    }

    /// Get a member by key
    pub fn get(&self, key: &str) -> Result<&Member, RegistryError> {
        self.index
            .get(key)
            .map(|&slot| &self.members[slot])
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Members in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for &'a MemberRegistry {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
