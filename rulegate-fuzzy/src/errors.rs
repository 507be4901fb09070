//! errors.rs - Error types for the rulegate-fuzzy crate.
//!
//! Every variant here is a configuration mistake: a banned word or a match
//! policy that cannot be turned into a pattern. None of them describe text
//! that failed to match.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FuzzyError {
    #[error("Banned word '{0}' consists only of boundary anchors")]
    AnchorOnlyWord(String),

    #[error("Policy {name} class '{class}' is not a valid pattern: {source}")]
    InvalidClass {
        name: &'static str,
        class: String,
        #[source]
        source: regex::Error,
    },

    #[error("Policy {name} class '{class}' must not contain capture groups")]
    CapturingClass { name: &'static str, class: String },

    #[error("Policy {name} class '{class}' must not match empty text")]
    EmptyMatchingClass { name: &'static str, class: String },

    #[error("Policy blank ratio threshold {0} is outside 0.0..=1.0")]
    InvalidRatio(f64),

    #[error("Failed to compile pattern for banned word '{0}': {1}")]
    PatternCompilationError(String, regex::Error),
}
