// rulegate-fuzzy/src/compiler/mod.rs
//! Synthesizes one regular expression per banned word.
//!
//! Each unit becomes its confusable class (or an escaped literal), with
//! `separator*` between units and around anchors. When the word is long
//! enough to allow masking, every unit also accepts one blank character, and
//! the number of blanks a single match may use is capped by the word's mask
//! budget.
//!
//! License: MIT OR Apache-2.0

use log::{debug, trace};
use regex::{Regex, RegexBuilder};

use crate::confusables::ConfusableMap;
use crate::errors::FuzzyError;
use crate::policy::MatchPolicy;
use crate::units::{split_units, Unit};

const RATIO_EPSILON: f64 = 1e-9;

/// A banned word compiled under one policy.
#[derive(Debug, Clone)]
pub struct CompiledWord {
    word: String,
    regex: Regex,
    units: usize,
    mask_budget: usize,
}

impl CompiledWord {
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The synthesized pattern source.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn unit_count(&self) -> usize {
        self.units
    }

    /// How many units one match may replace with blank characters.
    pub fn mask_budget(&self) -> usize {
        self.mask_budget
    }

    pub fn is_maskable(&self) -> bool {
        self.mask_budget > 0
    }

    /// Returns the first fragment of `text` matching this word within the
    /// mask budget.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut start = 0;
        while start <= text.len() {
            let caps = self.regex.captures_at(text, start)?;
            let whole = caps.get(0)?;
            let masked = caps.iter().skip(1).filter(Option::is_some).count();
            if masked <= self.mask_budget {
                return Some(whole.as_str());
            }
            trace!(
                "Match '{}' for '{}' uses {} blanks, budget is {}.",
                whole.as_str(),
                self.word,
                masked,
                self.mask_budget
            );
            start = next_char_boundary(text, whole.start());
        }
        None
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

/// Compiles `word` into a pattern tolerant of separators, blanks and
/// confusable characters.
pub fn compile(
    word: &str,
    confusables: &ConfusableMap,
    policy: &MatchPolicy,
) -> Result<CompiledWord, FuzzyError> {
    let parts = split_units(word);
    if parts.is_empty() {
        return Err(FuzzyError::AnchorOnlyWord(word.to_string()));
    }

    let blank = policy.blank_matcher()?;
    let is_blank = |unit: &Unit| matches!(unit, Unit::Grapheme(g) if blank.is_match(g));

    let units = parts.len();
    let already_masked = parts.units.iter().filter(|u| is_blank(u)).count();
    let budget = mask_budget(units, already_masked, policy);

    let separator = format!("(?:{})*", policy.separator_class);
    let mut pattern = String::new();

    if parts.anchored_start {
        pattern.push('^');
        pattern.push_str(&separator);
    }

    for unit in &parts.units {
        if is_blank(unit) {
            pattern.push_str(&format!("(?:{})", policy.blank_class));
        } else if budget > 0 {
            pattern.push_str(&format!(
                "(?:{}|({}))",
                unit_fragment(unit, confusables),
                policy.blank_class
            ));
        } else {
            pattern.push_str(&unit_fragment(unit, confusables));
        }
        pattern.push_str(&separator);
    }

    if parts.anchored_end {
        pattern.push('$');
    } else {
        pattern.truncate(pattern.len() - separator.len());
    }

    debug!(
        "Compiled banned word '{}' ({} units, mask budget {}).",
        word, units, budget
    );
    trace!("Pattern for '{}': {}", word, pattern);

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(10 * (1 << 20))
        .build()
        .map_err(|e| FuzzyError::PatternCompilationError(word.to_string(), e))?;

    Ok(CompiledWord {
        word: word.to_string(),
        regex,
        units,
        mask_budget: budget,
    })
}

// Masking is allowed only when the word is long enough and one more masked
// position still keeps the masked share within the threshold.
fn mask_budget(units: usize, already_masked: usize, policy: &MatchPolicy) -> usize {
    if units < policy.min_length_for_blank {
        return 0;
    }
    let estimated = (already_masked + 1) as f64 / units as f64;
    if estimated > policy.blank_ratio_threshold + RATIO_EPSILON {
        return 0;
    }
    let allowed = (units as f64 * policy.blank_ratio_threshold + RATIO_EPSILON).floor() as usize;
    allowed
        .saturating_sub(already_masked)
        .min(units.saturating_sub(already_masked + 1))
}

fn unit_fragment(unit: &Unit, confusables: &ConfusableMap) -> String {
    match unit {
        Unit::Grapheme(g) => match unit.single_char().and_then(|c| confusables.fragment(c)) {
            Some(fragment) => fragment.to_string(),
            None => regex::escape(g),
        },
        Unit::Escaped(g) => regex::escape(g),
    }
}

fn next_char_boundary(text: &str, idx: usize) -> usize {
    text[idx..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| idx + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confusables::DEFAULT_CONFUSABLES;

    fn policy(min_length_for_blank: usize, blank_ratio_threshold: f64) -> MatchPolicy {
        MatchPolicy {
            min_length_for_blank,
            blank_ratio_threshold,
            ..MatchPolicy::default()
        }
    }

    #[test]
    fn test_masked_unit_matches_within_ratio() {
        let word = compile("dummy", &DEFAULT_CONFUSABLES, &policy(3, 0.4)).unwrap();
        assert_eq!(word.mask_budget(), 2);
        assert_eq!(word.find("a d〇mmy here"), Some("d〇mmy"));
    }

    #[test]
    fn test_zero_ratio_disables_masking() {
        let word = compile("dummy", &DEFAULT_CONFUSABLES, &policy(3, 0.0)).unwrap();
        assert!(!word.is_maskable());
        assert_eq!(word.find("d〇mmy"), None);
        assert_eq!(word.find("dummy"), Some("dummy"));
    }

    #[test]
    fn test_short_word_is_never_masked() {
        let word = compile("ab", &DEFAULT_CONFUSABLES, &policy(3, 1.0)).unwrap();
        assert!(!word.is_maskable());
        assert!(!word.is_match("a*"));
    }

    #[test]
    fn test_mask_budget_caps_blank_count() {
        let word = compile("dummy", &DEFAULT_CONFUSABLES, &policy(3, 0.4)).unwrap();
        assert!(word.is_match("d**my"));
        assert!(!word.is_match("d***y"));
    }

    #[test]
    fn test_separators_between_units() {
        let word = compile("dummy", &DEFAULT_CONFUSABLES, &MatchPolicy::default()).unwrap();
        assert_eq!(word.find("x d-u m.m_y x"), Some("d-u m.m_y"));
    }

    #[test]
    fn test_confusable_forms_match() {
        let word = compile("dummy", &DEFAULT_CONFUSABLES, &MatchPolicy::default()).unwrap();
        assert!(word.is_match("ＤＵＭＭＹ"));
        assert!(word.is_match("ⓓⓤⓜⓜⓨ"));
        assert!(word.is_match("dümmy"));
    }

    #[test]
    fn test_anchors_require_boundaries() {
        let word = compile("^spam$", &DEFAULT_CONFUSABLES, &MatchPolicy::default()).unwrap();
        assert!(word.is_match("  s.p.a.m!"));
        assert!(!word.is_match("spammer"));
        assert!(!word.is_match("no spam"));
        assert!(word.pattern().starts_with('^'));
        assert!(word.pattern().ends_with('$'));
    }

    #[test]
    fn test_anchor_only_word_is_rejected() {
        let err = compile("^$", &DEFAULT_CONFUSABLES, &MatchPolicy::default()).unwrap_err();
        assert!(matches!(err, FuzzyError::AnchorOnlyWord(_)));
    }

    #[test]
    fn test_unanchored_pattern_has_no_trailing_separator() {
        let word = compile("ab", &DEFAULT_CONFUSABLES, &MatchPolicy::default()).unwrap();
        assert!(!word.pattern().ends_with(")*"));
    }

    #[test]
    fn test_word_with_mask_already_in_it() {
        let word = compile("f*ck", &DEFAULT_CONFUSABLES, &policy(3, 0.5)).unwrap();
        assert!(word.is_match("f_ck"));
        assert!(word.is_match("f*ck"));
        assert_eq!(word.mask_budget(), 1);
    }
}
