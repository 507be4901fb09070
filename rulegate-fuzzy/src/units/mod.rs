// rulegate-fuzzy/src/units/mod.rs
//! Splits a banned word into the units the compiler works on.
//!
//! A unit is a base character together with any combining marks that follow
//! it, so `é` written as `e` + U+0301 stays a single position. A backslash
//! escapes the next character, which is then always matched literally.
//! Leading `^` and trailing `$` are exact-boundary requests, not units.

use once_cell::sync::Lazy;
use regex::Regex;

static GRAPHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\.\p{M}*|\P{M}\p{M}*|\p{M}+").expect("grapheme pattern is valid")
});

/// One position of a banned word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A grapheme as written; eligible for confusable mapping.
    Grapheme(String),
    /// A backslash-escaped grapheme, matched literally.
    Escaped(String),
}

impl Unit {
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Grapheme(s) | Unit::Escaped(s) => s,
        }
    }

    /// The single character of this unit, if it has no combining marks.
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.as_str().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// A word decomposed into anchors and units.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordUnits {
    pub anchored_start: bool,
    pub anchored_end: bool,
    pub units: Vec<Unit>,
}

impl WordUnits {
    /// Number of units, anchors excluded.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Decomposes `word` into boundary anchors and grapheme units.
///
/// Whitespace inside the word is dropped: the compiler already allows any
/// run of separators between units.
pub fn split_units(word: &str) -> WordUnits {
    let mut body = word.trim();

    let anchored_start = body.starts_with('^');
    if anchored_start {
        body = &body[1..];
    }

    let anchored_end = body.ends_with('$') && !is_escaped_tail(body);
    if anchored_end {
        body = &body[..body.len() - 1];
    }

    let units = GRAPHEME
        .find_iter(body)
        .filter_map(|m| {
            let grapheme = m.as_str();
            if let Some(rest) = grapheme.strip_prefix('\\') {
                if !rest.is_empty() {
                    return Some(Unit::Escaped(rest.to_string()));
                }
            }
            if grapheme.chars().all(char::is_whitespace) {
                None
            } else {
                Some(Unit::Grapheme(grapheme.to_string()))
            }
        })
        .collect();

    WordUnits {
        anchored_start,
        anchored_end,
        units,
    }
}

// An odd number of backslashes before the final `$` escapes it.
fn is_escaped_tail(body: &str) -> bool {
    let before = &body[..body.len() - 1];
    before.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}
