//! Delimited-text import of professionals.
//!
//! # Responsibility
//! - Turn raw file content into validated creation requests.
//! - Detect and drop an optional header line.
//!
//! # Invariants
//! - Output keeps file order.
//! - Lines that do not yield two non-empty names are skipped silently.
//! - Only the first non-blank line is ever considered a header.
//!
//! Header detection is a locale heuristic: the first non-blank line is a
//! header when it contains `prénom` or `nom` in any letter case. Headers in
//! other languages are parsed as an ordinary record.

use crate::model::professional::NewProfessional;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(prénom|nom)").expect("valid header regex"));

const FIELD_SEPARATOR: char = ',';
const QUOTE: char = '"';

/// Parses comma-separated `first,last` lines into creation requests.
///
/// An empty result means the input held no usable record; callers report
/// that as one import failure.
pub fn parse_import(text: &str) -> Vec<NewProfessional> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty()).peekable();

    if lines.peek().is_some_and(|first| is_header(first)) {
        lines.next();
    }

    lines.filter_map(parse_line).collect()
}

/// Returns whether `line` looks like the `Prénom,Nom` header.
pub fn is_header(line: &str) -> bool {
    HEADER_RE.is_match(line)
}

fn parse_line(line: &str) -> Option<NewProfessional> {
    let (first, last) = line.split_once(FIELD_SEPARATOR)?;
    NewProfessional::new(clean_field(first), clean_field(last)).ok()
}

fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches(QUOTE).trim()
}
