// rulegate-core/src/registry.rs
//! The check registry: check id → shared check.
//!
//! Rules are resolved against a registry once, when an entity shape is
//! built. After that the registry is no longer consulted, so a shape keeps
//! working even if the registry it came from is dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use rulegate_fuzzy::{FuzzyMatcher, MatchPolicy};

use crate::check::Check;
use crate::checks;
use crate::errors::ConfigError;
use crate::rule::{Rule, RuleDecl};

#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: HashMap<String, Arc<dyn Check>>,
}

impl CheckRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in check, with `banned_words` using the
    /// default match policy.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        checks::register_builtins(&mut registry, Arc::new(FuzzyMatcher::default()));
        registry
    }

    /// Like [`with_builtins`](Self::with_builtins) with a custom policy for
    /// `banned_words`.
    pub fn with_word_policy(policy: MatchPolicy) -> Result<Self, ConfigError> {
        let matcher = FuzzyMatcher::new(policy)?;
        let mut registry = Self::new();
        checks::register_builtins(&mut registry, Arc::new(matcher));
        Ok(registry)
    }

    /// Registers `check` under `id`, replacing any previous check with that id.
    pub fn register<C>(&mut self, id: impl Into<String>, check: C) -> &mut Self
    where
        C: Check + 'static,
    {
        self.register_shared(id, Arc::new(check))
    }

    pub fn register_shared(&mut self, id: impl Into<String>, check: Arc<dyn Check>) -> &mut Self {
        let id = id.into();
        if self.checks.insert(id.clone(), check).is_some() {
            warn!("Check '{}' was registered twice; the later registration wins.", id);
        } else {
            debug!("Registered check '{}'.", id);
        }
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.checks.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Binds `decl` to its check and lets the check validate its arguments.
    pub fn resolve(&self, field: &str, decl: RuleDecl) -> Result<Rule, ConfigError> {
        if decl.scope.is_empty() {
            return Err(ConfigError::EmptyScope {
                field: field.to_string(),
                check: decl.check,
            });
        }
        let check = self
            .checks
            .get(&decl.check)
            .ok_or_else(|| ConfigError::UnknownCheck {
                field: field.to_string(),
                check: decl.check.clone(),
            })?;
        check.prepare(&decl.args)?;
        Ok(Rule::new(decl, Arc::clone(check)))
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry").field("checks", &self.ids()).finish()
    }
}
