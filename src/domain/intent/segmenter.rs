//! Query segmentation into sub-intents.
//!
//! Two kinds of boundary are recognised. Strong markers ("then", "after
//! that", "also", ";") always split. Weak markers ("and", ",") only split
//! when both sides independently look like a tool request, so that
//! "recipe for rice and beans" stays one clause.

use once_cell::sync::Lazy;
use regex::Regex;

static STRONG_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*(?:[,;]\s*)?\b(?P<marker>and then|and after that|after that|afterwards|then|and also|also)\b\s*|\s*;\s*",
    )
    .unwrap_or_else(|e| panic!("invalid strong marker regex: {e}"))
});

static WEAK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*,\s*(?:and\s+)?|\s+and\s+")
        .unwrap_or_else(|e| panic!("invalid weak marker regex: {e}"))
});

static LEADING_FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:please|and|also|can you|could you|would you|i want to|i'd like to|i would like to)\b[\s,]*",
    )
    .unwrap_or_else(|e| panic!("invalid filler regex: {e}"))
});

static TRAILING_FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[\s,]+please)?[\s?.!]*$")
        .unwrap_or_else(|e| panic!("invalid filler regex: {e}"))
});

/// One sub-intent of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// 0-based position among the clauses of the query.
    pub index: usize,
    pub text: String,
    /// Introduced by a sequencing marker ("then", "after that"), meaning an
    /// unfilled parameter may bind to the previous result.
    pub sequenced: bool,
}

/// Splits query text into clauses.
///
/// `recognises` reports whether a candidate clause would match some tool;
/// it decides whether weak markers split.
pub fn segment<F>(text: &str, recognises: F) -> Vec<Clause>
where
    F: Fn(&str) -> bool,
{
    let mut clauses = Vec::new();

    for (piece, sequenced) in split_strong(text) {
        let mut first = true;
        for clause_text in split_weak(&piece, &recognises) {
            clauses.push(Clause {
                index: clauses.len(),
                text: clause_text,
                sequenced: sequenced && first,
            });
            first = false;
        }
    }

    clauses
}

/// Normalises a clause: collapses whitespace and strips filler words and
/// trailing punctuation.
pub fn clean(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut current = collapsed.as_str();
    loop {
        let stripped = LEADING_FILLER.replace(current, "");
        if stripped.len() == current.len() {
            break;
        }
        current = &current[current.len() - stripped.len()..];
    }
    TRAILING_FILLER.replace(current, "").trim().to_string()
}

fn split_strong(text: &str) -> Vec<(String, bool)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut sequenced = false;

    for caps in STRONG_MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        pieces.push((text[start..whole.start()].to_string(), sequenced));
        sequenced = caps
            .name("marker")
            .map(|m| {
                let marker = m.as_str().to_ascii_lowercase();
                marker.contains("then") || marker.contains("after")
            })
            .unwrap_or(false);
        start = whole.end();
    }
    pieces.push((text[start..].to_string(), sequenced));

    pieces
        .into_iter()
        .map(|(piece, seq)| (clean(&piece), seq))
        .filter(|(piece, _)| !piece.is_empty())
        .collect()
}

fn split_weak<F>(piece: &str, recognises: &F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut parts: Vec<(&str, &str)> = Vec::new();
    let mut start = 0;
    let mut delimiter = "";
    for m in WEAK_MARKER.find_iter(piece) {
        parts.push((delimiter, &piece[start..m.start()]));
        delimiter = m.as_str();
        start = m.end();
    }
    parts.push((delimiter, &piece[start..]));

    let mut out = Vec::new();
    let mut iter = parts.into_iter();
    let Some((_, head)) = iter.next() else {
        return out;
    };
    let mut current = head.to_string();

    for (delimiter, part) in iter {
        let candidate = clean(part);
        if !candidate.is_empty() && recognises(&clean(&current)) && recognises(&candidate) {
            out.push(clean(&current));
            current = part.to_string();
        } else {
            current.push_str(delimiter);
            current.push_str(part);
        }
    }
    let last = clean(&current);
    if !last.is_empty() {
        out.push(last);
    }

    out
}
