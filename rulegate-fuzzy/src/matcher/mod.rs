// rulegate-fuzzy/src/matcher/mod.rs
//! Runs a banned-word list against text.
//!
//! `FuzzyMatcher` keeps a compile cache keyed by word so a check that runs on
//! every validation does not rebuild the same patterns. The cache belongs to
//! the matcher instance; there is no process-wide mutable state.
//!
//! The cache is unbounded: it holds every distinct word the matcher has
//! compiled. Long-lived matchers fed arbitrary word lists should call
//! [`FuzzyMatcher::clear_cache`] or be rebuilt periodically.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::debug;

use crate::compiler::{compile, CompiledWord};
use crate::confusables::{ConfusableMap, DEFAULT_CONFUSABLES};
use crate::errors::FuzzyError;
use crate::policy::MatchPolicy;
use crate::units::split_units;

/// A banned word found in text, and the fragment that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMatch {
    pub word: String,
    pub fragment: String,
}

/// A policy and confusable table bound together with a compile cache.
#[derive(Debug)]
pub struct FuzzyMatcher {
    policy: MatchPolicy,
    confusables: Arc<ConfusableMap>,
    cache: RwLock<HashMap<String, Arc<CompiledWord>>>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            policy: MatchPolicy::default(),
            confusables: Arc::new(DEFAULT_CONFUSABLES.clone()),
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl FuzzyMatcher {
    /// Creates a matcher over the standard confusable table.
    pub fn new(policy: MatchPolicy) -> Result<Self, FuzzyError> {
        Self::with_confusables(policy, Arc::new(DEFAULT_CONFUSABLES.clone()))
    }

    pub fn with_confusables(
        policy: MatchPolicy,
        confusables: Arc<ConfusableMap>,
    ) -> Result<Self, FuzzyError> {
        policy.validate()?;
        Ok(Self {
            policy,
            confusables,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Gets the compiled form of `word`, compiling and caching it on first use.
    pub fn compiled(&self, word: &str) -> Result<Arc<CompiledWord>, FuzzyError> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(compiled) = cache.get(word) {
                return Ok(Arc::clone(compiled));
            }
        }

        let compiled = Arc::new(compile(word, &self.confusables, &self.policy)?);
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(word.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Returns the first fragment of `text` matched by any of `words`,
    /// trying words in the order given.
    pub fn match_any<S: AsRef<str>>(
        &self,
        text: &str,
        words: &[S],
    ) -> Result<Option<String>, FuzzyError> {
        Ok(self.find_any(text, words)?.map(|found| found.fragment))
    }

    /// Like [`match_any`](Self::match_any), but also reports which word
    /// matched. Words with more units than `text` has characters are
    /// skipped without being compiled.
    pub fn find_any<S: AsRef<str>>(
        &self,
        text: &str,
        words: &[S],
    ) -> Result<Option<WordMatch>, FuzzyError> {
        let text_len = text.chars().count();

        for word in words {
            let word = word.as_ref();
            if split_units(word).len() > text_len {
                continue;
            }
            if let Some(found) = self.compiled(word)?.find(text) {
                debug!("Banned word '{}' matched fragment '{}'.", word, found);
                return Ok(Some(WordMatch {
                    word: word.to_string(),
                    fragment: found.to_string(),
                }));
            }
        }
        Ok(None)
    }

    /// Number of distinct words compiled so far.
    pub fn cached_words(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drops every cached pattern.
    pub fn clear_cache(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// One-shot form of [`FuzzyMatcher::match_any`] over the standard
/// confusable table. Nothing is cached between calls.
pub fn match_any<S: AsRef<str>>(
    text: &str,
    words: &[S],
    policy: &MatchPolicy,
) -> Result<Option<String>, FuzzyError> {
    policy.validate()?;
    let text_len = text.chars().count();

    for word in words {
        let word = word.as_ref();
        if split_units(word).len() > text_len {
            continue;
        }
        let compiled = compile(word, &DEFAULT_CONFUSABLES, policy)?;
        if let Some(found) = compiled.find(text) {
            return Ok(Some(found.to_string()));
        }
    }
    Ok(None)
}
