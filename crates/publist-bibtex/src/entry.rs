//! BibTeX entry data structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A parsed BibTeX entry
///
/// Field names are stored lower-cased, values are kept verbatim (inner
/// braces included) so they can be dropped straight into TeX output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BibTeXEntry {
    pub cite_key: String,
    pub entry_type: String,
    pub fields: BTreeMap<String, String>,
}

impl BibTeXEntry {
    /// Create a new BibTeX entry
    pub fn new(cite_key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            cite_key: cite_key.into(),
            entry_type: entry_type.into().to_lowercase(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field; later values for the same key replace earlier ones
    pub fn set_field(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(key.as_ref().to_lowercase(), value.into());
    }

    /// Builder-style variant of [`set_field`](Self::set_field)
    pub fn with_field(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    pub fn doi(&self) -> Option<&str> {
        self.get_field("doi")
    }

    /// arXiv identifier, as exported by ADS in the `eprint` field
    pub fn eprint(&self) -> Option<&str> {
        self.get_field("eprint")
    }

    pub fn journal(&self) -> Option<&str> {
        self.get_field("journal")
    }
}
