// rulegate-fuzzy/tests/matching_tests.rs
use rulegate_fuzzy::{compile, match_any, ConfusableMap, FuzzyMatcher, MatchPolicy, DEFAULT_CONFUSABLES};
use std::sync::Arc;
use test_log::test;

fn policy(min_length_for_blank: usize, blank_ratio_threshold: f64) -> MatchPolicy {
    MatchPolicy {
        min_length_for_blank,
        blank_ratio_threshold,
        ..MatchPolicy::default()
    }
}

#[test]
fn test_dummy_with_circle_mask_depends_on_ratio() {
    let lenient = compile("dummy", &DEFAULT_CONFUSABLES, &policy(3, 0.4)).unwrap();
    assert!(lenient.is_match("d〇mmy"));

    let strict = compile("dummy", &DEFAULT_CONFUSABLES, &policy(3, 0.0)).unwrap();
    assert!(!strict.is_match("d〇mmy"));
}

#[test]
fn test_word_longer_than_text_never_matches() {
    let found = match_any("abc", &["abcdef"], &MatchPolicy::default()).unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_match_any_returns_matched_fragment() {
    let text = "Please don't write s-p-a-m in here";
    let found = match_any(text, &["ham", "spam"], &MatchPolicy::default()).unwrap();
    assert_eq!(found.as_deref(), Some("s-p-a-m"));
}

#[test]
fn test_katakana_word_matches_hiragana_and_half_width() {
    let matcher = FuzzyMatcher::default();
    assert!(matcher.match_any("ばかやろう", &["ばか"]).unwrap().is_some());
    assert!(matcher.match_any("ﾃｽﾄです", &["テスト"]).unwrap().is_some());
    assert!(matcher.match_any("てすと", &["テスト"]).unwrap().is_some());
}

#[test]
fn test_custom_confusables_extend_standard_table() {
    let map = rulegate_fuzzy::ConfusableMapBuilder::standard()
        .class(['o', '0'])
        .build();
    let matcher = FuzzyMatcher::with_confusables(MatchPolicy::default(), Arc::new(map)).unwrap();
    assert!(matcher.match_any("g00d", &["good"]).unwrap().is_some());
}

#[test]
fn test_empty_confusable_map_matches_literally() {
    let matcher =
        FuzzyMatcher::with_confusables(MatchPolicy::default(), Arc::new(ConfusableMap::default()))
            .unwrap();
    assert!(matcher.match_any("ＤＵＭＭＹ", &["dummy"]).unwrap().is_none());
    assert!(matcher.match_any("DUMMY", &["dummy"]).unwrap().is_some());
}

#[test]
fn test_policy_loaded_from_json() {
    let policy: MatchPolicy =
        serde_json::from_str(r#"{"separator_class": "[-]", "blank_ratio_threshold": 0.0}"#).unwrap();
    assert_eq!(match_any("d-u-m-m-y", &["dummy"], &policy).unwrap().as_deref(), Some("d-u-m-m-y"));
    assert_eq!(match_any("d u m m y", &["dummy"], &policy).unwrap(), None);
}
