//! BibTeX parser implementation using nom
//!
//! Handles what the ADS export endpoint produces, plus the usual extras:
//! - @string definitions (case-insensitive macro names)
//! - @preamble and @comment sections (skipped)
//! - Braced and quoted field values with nested braces
//! - String concatenation with #
//! - Cite keys containing `.`, `&` and `+`, as bibcodes do
//!
//! A malformed entry is recorded in [`BibTeXParseResult::errors`] and parsing
//! resumes at the next `@`.

use std::collections::{BTreeMap, HashMap};

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    sequence::{delimited, preceded},
    IResult,
};

use crate::entry::BibTeXEntry;

/// Position and description of an entry that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXParseError {
    pub line: u32,
    pub message: String,
}

/// Result of parsing a BibTeX blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibTeXParseResult {
    pub entries: Vec<BibTeXEntry>,
    pub strings: HashMap<String, String>,
    pub errors: Vec<BibTeXParseError>,
}

/// Error type for strict parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{count} BibTeX entries could not be parsed, first at line {line}")]
    Malformed { count: usize, line: u32 },
}

impl BibTeXParseResult {
    /// Fail if any entry was skipped during recovery
    pub fn strict(self) -> Result<Self, ParseError> {
        match self.errors.first() {
            Some(first) => Err(ParseError::Malformed {
                count: self.errors.len(),
                line: first.line,
            }),
            None => Ok(self),
        }
    }
}

/// Parse a BibTeX string, recovering from malformed entries
pub fn parse(input: &str) -> BibTeXParseResult {
    let mut result = BibTeXParseResult::default();
    let mut remaining = input;
    let mut line = 1u32;

    loop {
        let (rest, skipped) = skip_whitespace_and_comments(remaining);
        line += count_lines(skipped);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        if !remaining.starts_with('@') {
            // Free text between entries is a comment in BibTeX
            match remaining.find('@') {
                Some(pos) => {
                    line += count_lines(&remaining[..pos]);
                    remaining = &remaining[pos..];
                    continue;
                }
                None => break,
            }
        }

        match parse_at_entry(remaining, &result.strings) {
            Ok((rest, parsed)) => {
                match parsed {
                    AtEntry::Entry(entry) => result.entries.push(entry),
                    AtEntry::String(key, value) => {
                        result.strings.insert(key, value);
                    }
                    AtEntry::Skipped => {}
                }
                line += count_lines(&remaining[..remaining.len() - rest.len()]);
                remaining = rest;
            }
            Err(_) => {
                result.errors.push(BibTeXParseError {
                    line,
                    message: format!("Failed to parse entry: {}", first_line(remaining)),
                });
                match remaining[1..].find('@') {
                    Some(pos) => {
                        line += count_lines(&remaining[..pos + 1]);
                        remaining = &remaining[pos + 1..];
                    }
                    None => break,
                }
            }
        }
    }

    result
}

/// Parse a blob and index its entries by cite key
///
/// Later entries with the same key replace earlier ones.
pub fn entries_by_key(input: &str) -> BTreeMap<String, BibTeXEntry> {
    parse(input)
        .entries
        .into_iter()
        .map(|entry| (entry.cite_key.clone(), entry))
        .collect()
}

enum AtEntry {
    Entry(BibTeXEntry),
    String(String, String),
    Skipped,
}

fn count_lines(text: &str) -> u32 {
    text.matches('\n').count() as u32
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

/// Skip whitespace and `%` line comments
fn skip_whitespace_and_comments(input: &str) -> (&str, &str) {
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b if b.is_ascii_whitespace() => pos += 1,
            b'%' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            _ => break,
        }
    }

    (&input[pos..], &input[..pos])
}

fn parse_at_entry<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtEntry> {
    let (rest, kind) = preceded(
        char('@'),
        preceded(multispace0, take_while1(|c: char| c.is_ascii_alphanumeric())),
    )(input)?;

    match kind.to_lowercase().as_str() {
        "comment" => {
            let (rest, _) = multispace0(rest)?;
            if rest.starts_with('{') {
                let (rest, _) = braced_content(rest)?;
                Ok((rest, AtEntry::Skipped))
            } else {
                let end = rest.find('\n').unwrap_or(rest.len());
                Ok((&rest[end..], AtEntry::Skipped))
            }
        }
        "preamble" => {
            let (rest, _) = preceded(multispace0, braced_content)(rest)?;
            Ok((rest, AtEntry::Skipped))
        }
        "string" => {
            let (rest, (key, value)) = delimited(
                preceded(multispace0, char('{')),
                |i| field_assignment(i, strings),
                preceded(multispace0, char('}')),
            )(rest)?;
            Ok((rest, AtEntry::String(key.to_lowercase(), value)))
        }
        _ => {
            let (rest, entry) = entry_body(rest, kind, strings)?;
            Ok((rest, AtEntry::Entry(entry)))
        }
    }
}

fn entry_body<'a>(
    input: &'a str,
    kind: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibTeXEntry> {
    let (rest, open) = preceded(multispace0, alt((char('{'), char('('))))(input)?;
    let close = if open == '{' { '}' } else { ')' };

    let (rest, cite_key) = preceded(
        multispace0,
        take_while1(|c: char| !c.is_whitespace() && !",{}()".contains(c)),
    )(rest)?;
    let (mut rest, _) = preceded(multispace0, char(','))(rest)?;

    let mut entry = BibTeXEntry::new(cite_key, kind);

    loop {
        let (after_ws, _) = multispace0(rest)?;
        if let Some(stripped) = after_ws.strip_prefix(close) {
            return Ok((stripped, entry));
        }

        let (after_field, (key, value)) = field_assignment(after_ws, strings)?;
        entry.set_field(key, value);

        let (after_ws, _) = multispace0(after_field)?;
        rest = after_ws.strip_prefix(',').unwrap_or(after_ws);
    }
}

/// Parse `key = value`
fn field_assignment<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, key) = preceded(
        multispace0,
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-.:".contains(c)),
    )(input)?;
    let (rest, _) = preceded(multispace0, char('='))(rest)?;
    let (rest, value) = field_value(rest, strings)?;

    Ok((rest, (key.to_string(), value)))
}

/// Parse a field value: braced, quoted, number or macro, joined by `#`
fn field_value<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    let mut value = String::new();
    let mut remaining = input;

    loop {
        let (rest, part) = preceded(
            multispace0,
            alt((
                map(braced_content, |s: &str| s[1..s.len() - 1].to_string()),
                map(quoted_content, |s: &str| s[1..s.len() - 1].to_string()),
                map(
                    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
                    |s: &str| {
                        strings
                            .get(&s.to_lowercase())
                            .cloned()
                            .unwrap_or_else(|| s.to_string())
                    },
                ),
            )),
        )(remaining)?;
        value.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, value)),
        }
    }
}

fn malformed(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}

/// Match `{...}` with nested braces, returning the slice including both braces
fn braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(malformed(input));
    }

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(malformed(input))
}

/// Match `"..."`, where quotes inside braces do not terminate the value
fn quoted_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('"') {
        return Err(malformed(input));
    }

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 1;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if depth == 0 => return Ok((&input[pos + 1..], &input[..pos + 1])),
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(malformed(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADS_EXPORT: &str = r#"
@ARTICLE{2015ApJ...806..206A,
       author = {{Abbott}, T. and {Abdalla}, F.~B.},
        title = "{The Dark Energy Survey: more than dark energy}",
      journal = {\apj},
         year = 2015,
        month = jun,
       volume = {806},
          doi = {10.1088/0004-637X/806/2/206},
archivePrefix = {arXiv},
       eprint = {1502.01111},
}

@INPROCEEDINGS{2014SPIE.9145E..0AB,
        title = "{A {Telescope} Design}",
}
"#;

    #[test]
    fn test_parse_ads_export() {
        let result = parse(ADS_EXPORT);
        assert!(result.errors.is_empty());
        assert_eq!(result.entries.len(), 2);

        let entry = &result.entries[0];
        assert_eq!(entry.cite_key, "2015ApJ...806..206A");
        assert_eq!(entry.entry_type, "article");
        assert_eq!(
            entry.title(),
            Some("{The Dark Energy Survey: more than dark energy}")
        );
        assert_eq!(entry.doi(), Some("10.1088/0004-637X/806/2/206"));
        assert_eq!(entry.eprint(), Some("1502.01111"));
        assert_eq!(entry.get_field("year"), Some("2015"));
        assert_eq!(entry.get_field("month"), Some("jun"));
        assert_eq!(entry.get_field("archiveprefix"), Some("arXiv"));

        assert_eq!(result.entries[1].title(), Some("{A {Telescope} Design}"));
    }

    #[test]
    fn test_entries_by_key() {
        let entries = entries_by_key(ADS_EXPORT);
        assert!(entries.contains_key("2014SPIE.9145E..0AB"));
        assert!(entries.contains_key("2015ApJ...806..206A"));
    }

    #[test]
    fn test_string_macros_and_concatenation() {
        let input = r#"
@string{ApJ = "Astrophysical Journal"}
@comment{ignored @entry inside}
@article{2015A&A...500..100B,
    journal = apj # { Letters},
}
"#;
        let result = parse(input);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "2015A&A...500..100B");
        assert_eq!(
            result.entries[0].journal(),
            Some("Astrophysical Journal Letters")
        );
    }

    #[test]
    fn test_recovers_after_malformed_entry() {
        let input = "@article{broken, title = {unclosed\n\n@article{ok, title = {Fine}}";
        let result = parse(input);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "ok");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 1);
        assert!(parse(input).strict().is_err());
    }

    #[test]
    fn test_non_ascii_values_survive() {
        let result = parse("@article{k, title = \"Caf\u{e9} {\u{f8}}\"}");
        assert_eq!(result.entries[0].title(), Some("Caf\u{e9} {\u{f8}}"));
    }
}
