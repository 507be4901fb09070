// rulegate-fuzzy/src/policy/mod.rs
//! Matching policy for banned-word patterns.

use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::FuzzyError;

pub const DEFAULT_SEPARATOR_CLASS: &str = r"[\s\p{P}\p{S}\p{Cf}]";
pub const DEFAULT_BLANK_CLASS: &str = "[*＊_＿〇○◯●◎?？]";
pub const DEFAULT_MIN_LENGTH_FOR_BLANK: usize = 3;
pub const DEFAULT_BLANK_RATIO_THRESHOLD: f64 = 0.4;

/// How tolerant a compiled word is of separators and masking characters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Pattern class for characters that may appear between units.
    pub separator_class: String,
    /// Pattern class for characters that may stand in for a unit.
    pub blank_class: String,
    /// Words shorter than this never allow masking.
    pub min_length_for_blank: usize,
    /// Upper bound on the share of a word's units that may be masked.
    pub blank_ratio_threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            separator_class: DEFAULT_SEPARATOR_CLASS.to_string(),
            blank_class: DEFAULT_BLANK_CLASS.to_string(),
            min_length_for_blank: DEFAULT_MIN_LENGTH_FOR_BLANK,
            blank_ratio_threshold: DEFAULT_BLANK_RATIO_THRESHOLD,
        }
    }
}

impl Hash for MatchPolicy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.separator_class.hash(state);
        self.blank_class.hash(state);
        self.min_length_for_blank.hash(state);
        self.blank_ratio_threshold.to_bits().hash(state);
    }
}

impl MatchPolicy {
    /// Checks that both classes compile on their own and carry no capture
    /// groups, and that the ratio lies within `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), FuzzyError> {
        check_class("separator", &self.separator_class)?;
        check_class("blank", &self.blank_class)?;
        if !(0.0..=1.0).contains(&self.blank_ratio_threshold) {
            return Err(FuzzyError::InvalidRatio(self.blank_ratio_threshold));
        }
        Ok(())
    }

    /// A regex matching exactly one blank character.
    pub(crate) fn blank_matcher(&self) -> Result<Regex, FuzzyError> {
        Regex::new(&format!("^(?:{})$", self.blank_class)).map_err(|source| {
            FuzzyError::InvalidClass {
                name: "blank",
                class: self.blank_class.clone(),
                source,
            }
        })
    }
}

fn check_class(name: &'static str, class: &str) -> Result<(), FuzzyError> {
    let re = Regex::new(class).map_err(|source| FuzzyError::InvalidClass {
        name,
        class: class.to_string(),
        source,
    })?;
    if re.captures_len() > 1 {
        return Err(FuzzyError::CapturingClass {
            name,
            class: class.to_string(),
        });
    }
    // A unit must consume at least one character.
    if re.is_match("") {
        return Err(FuzzyError::EmptyMatchingClass {
            name,
            class: class.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(MatchPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_capturing_class_is_rejected() {
        let policy = MatchPolicy {
            separator_class: "([-.])".to_string(),
            ..MatchPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(FuzzyError::CapturingClass { name: "separator", .. })
        ));
    }

    #[test]
    fn test_class_matching_empty_text_is_rejected() {
        let policy = MatchPolicy {
            blank_class: "a*".to_string(),
            ..MatchPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(FuzzyError::EmptyMatchingClass { name: "blank", .. })
        ));

        let policy = MatchPolicy {
            separator_class: "[-.]?".to_string(),
            ..MatchPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(FuzzyError::EmptyMatchingClass { name: "separator", .. })
        ));
    }

    #[test]
    fn test_ratio_out_of_range_is_rejected() {
        let policy = MatchPolicy {
            blank_ratio_threshold: 1.5,
            ..MatchPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(FuzzyError::InvalidRatio(_))));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let policy: MatchPolicy = serde_yml::from_str("min_length_for_blank: 5\n").unwrap();
        assert_eq!(policy.min_length_for_blank, 5);
        assert_eq!(policy.blank_class, DEFAULT_BLANK_CLASS);
    }
}
