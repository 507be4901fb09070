// rulegate-core/src/headless.rs
//! One-shot helpers for non-interactive use.
//!
//! These wrap the usual sequence (build a record, bind JSON into it,
//! validate it) into a single call, the way the CLI and simple services use
//! the library.

use anyhow::{Context, Result};
use log::debug;
use rulegate_fuzzy::{FuzzyMatcher, MatchPolicy};
use serde_json::Value;

use crate::binder::{self, DefaultConverter};
use crate::config::Schema;
use crate::tree::{ErrorMap, ValidationReport};

/// Validates a JSON object as an instance of `entity` under the scope
/// expression `scope`.
///
/// # Arguments
///
/// * `schema` - A built schema.
/// * `entity` - Name of the entity type declared in the schema.
/// * `scope` - Scope expression, e.g. `"create"` or `"create|publish"`.
/// * `input` - The JSON object to bind.
pub fn headless_validate_json(
    schema: &Schema,
    entity: &str,
    scope: &str,
    input: &Value,
) -> Result<ValidationReport> {
    let scope = schema.parse_scope(scope)?;
    let mut record = schema.record(entity)?;
    binder::populate(&mut record, input, &DefaultConverter)
        .with_context(|| format!("Failed to bind input to entity '{}'", entity))?;

    let report = schema.validator().run(&mut record, scope, ErrorMap::new())?;
    debug!(
        "Headless validation of '{}' finished: {} failing key(s).",
        entity,
        report.errors.len()
    );
    Ok(report)
}

/// Finds the first banned word in `text`, returning the matched fragment.
pub fn headless_find_banned<S: AsRef<str>>(
    text: &str,
    words: &[S],
    policy: MatchPolicy,
) -> Result<Option<String>> {
    let matcher = FuzzyMatcher::new(policy).context("Invalid match policy")?;
    Ok(matcher.match_any(text, words)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use serde_json::json;

    #[test]
    fn test_headless_validate_json() {
        let schema = SchemaConfig::from_yaml_str(
            "entities:\n  user:\n    fields: [name]\n    rules:\n      name:\n        - [required, save]\n",
        )
        .unwrap()
        .build()
        .unwrap();

        let report = headless_validate_json(&schema, "user", "create", &json!({"name": ""})).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors.get("name").unwrap(), ["name is required"]);

        assert!(headless_validate_json(&schema, "user", "bogus", &json!({})).is_err());
        assert!(headless_validate_json(&schema, "ghost", "create", &json!({})).is_err());
    }

    #[test]
    fn test_headless_find_banned() {
        let found = headless_find_banned("s p a m", &["spam"], MatchPolicy::default()).unwrap();
        assert_eq!(found.as_deref(), Some("s p a m"));
    }
}
