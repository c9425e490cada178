//! Bibcode helpers
//!
//! A bibcode is the fixed-format ADS record id `YYYYJJJJJVVVVMPPPPA`; chars
//! 4..9 hold the journal abbreviation, right-padded with `.`.

/// The raw five-character journal field, padding included
///
/// Short or malformed ids yield whatever part of the field exists.
pub fn journal_field(bibcode: &str) -> &str {
    let start = byte_offset(bibcode, 4);
    let end = byte_offset(bibcode, 9);
    &bibcode[start..end]
}

/// Journal code with `.` padding stripped, e.g. `ApJ` for `2015ApJ...806..206A`
pub fn journal_code(bibcode: &str) -> &str {
    journal_field(bibcode).trim_matches('.')
}

/// Whether the bibcode denotes an arXiv e-print
pub fn is_arxiv(bibcode: &str) -> bool {
    journal_field(bibcode) == "arXiv"
}

/// Byte offset of the `n`th char, clamped to the string length
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}
