// rulegate-fuzzy/src/lib.rs
//! # Rulegate fuzzy word matching
//!
//! `rulegate-fuzzy` turns a banned word into a single regular expression that
//! still matches when the word is written with separators in between
//! (`d.u.m.m.y`), with masking characters standing in for letters (`d*mmy`),
//! or with visually confusable characters (`ｄｕｍｍｙ`, `ⓓⓤⓜⓜⓨ`).
//!
//! ## Modules
//!
//! * `units`: splits a word into grapheme units and boundary anchors.
//! * `confusables`: equivalence classes of interchangeable characters.
//! * `policy`: separator/blank classes and the masking thresholds.
//! * `compiler`: synthesizes and compiles the pattern for one word.
//! * `matcher`: runs a word list against text, with a per-instance compile cache.
//!
//! ## Usage Example
//!
//! ```rust
//! use rulegate_fuzzy::{match_any, MatchPolicy};
//!
//! let policy = MatchPolicy::default();
//! let found = match_any("this is a d.u.m.m.y text", &["dummy"], &policy).unwrap();
//! assert_eq!(found.as_deref(), Some("d.u.m.m.y"));
//! ```
//!
//! License: MIT OR Apache-2.0

pub mod compiler;
pub mod confusables;
pub mod errors;
pub mod matcher;
pub mod policy;
pub mod units;

pub use compiler::{compile, CompiledWord};
pub use confusables::{ConfusableMap, ConfusableMapBuilder, DEFAULT_CONFUSABLES};
pub use errors::FuzzyError;
pub use matcher::{match_any, FuzzyMatcher, WordMatch};
pub use policy::MatchPolicy;
pub use units::{split_units, Unit, WordUnits};
