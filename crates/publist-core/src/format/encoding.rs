//! Output encoding and character substitution
//!
//! Rendered lines are Rust strings (UTF-8), but the consumer may only accept
//! a narrower encoding, e.g. a LaTeX toolchain without `inputenc`. Lines that
//! do not fit are rewritten through a substitution table.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Encoding every rendered line must be representable in
///
/// Config values are parsed like `--encoding`, so `UTF-8` or `iso-8859-1`
/// are accepted there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TargetEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
    #[serde(rename = "ascii")]
    Ascii,
}

impl TargetEncoding {
    pub fn can_encode(self, c: char) -> bool {
        match self {
            TargetEncoding::Utf8 => true,
            TargetEncoding::Latin1 => (c as u32) < 0x100,
            TargetEncoding::Ascii => c.is_ascii(),
        }
    }

    pub fn can_encode_str(self, s: &str) -> bool {
        s.chars().all(|c| self.can_encode(c))
    }
}

impl TryFrom<String> for TargetEncoding {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl std::str::FromStr for TargetEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            other => Err(format!("unsupported encoding: {}", other)),
        }
    }
}

/// UTF-8 to TeX replacements for characters seen in member names and titles
pub fn default_tex_substitutions() -> BTreeMap<String, String> {
    [
        ('\u{af}', "-"),
        ('\u{b1}', r"\pm"),
        ('\u{107}', r"\'{c}"),
        ('\u{e9}', r"\'{e}"),
        ('\u{e1}', r"\'{a}"),
        ('\u{fc}', r#"\"{u}"#),
        ('\u{ed}', r"\'{\i}"),
        ('\u{f8}', r"\o"),
    ]
    .into_iter()
    .map(|(c, tex)| (c.to_string(), tex.to_string()))
    .collect()
}

/// Applies a [`TargetEncoding`] with its fallback substitution table
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    encoding: TargetEncoding,
    substitutions: HashMap<char, String>,
}

impl Transcoder {
    /// Keys that are not exactly one character are ignored
    pub fn new(encoding: TargetEncoding, substitutions: &BTreeMap<String, String>) -> Self {
        let substitutions = substitutions
            .iter()
            .filter_map(|(key, value)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((c, value.clone())),
                    _ => None,
                }
            })
            .collect();
        Self {
            encoding,
            substitutions,
        }
    }

    pub fn encoding(&self) -> TargetEncoding {
        self.encoding
    }

    /// Return `line` unchanged if it fits the encoding, otherwise with every
    /// character that has a substitution replaced
    ///
    /// Characters without a substitution are kept as they are.
    pub fn apply(&self, line: String) -> String {
        if self.encoding.can_encode_str(&line) {
            return line;
        }

        let substituted: String = line
            .chars()
            .map(|c| match self.substitutions.get(&c) {
                Some(replacement) => replacement.clone(),
                None => c.to_string(),
            })
            .collect();

        if !self.encoding.can_encode_str(&substituted) {
            warn!(line = %substituted, "No substitution for some characters");
        }
        substituted
    }
}
