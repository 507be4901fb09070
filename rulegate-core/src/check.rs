// rulegate-core/src/check.rs
//! The contract between the rule engine and check functions.
//!
//! A check receives the field being validated, its label and current value,
//! a read-only view of the entity (for cross-field comparisons) and the
//! snapshots of every ancestor entity, plus the rule's arguments. It answers
//! with an [`Outcome`].

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::entity::Entity;
use crate::errors::ConfigError;
use crate::flags::Scope;
use crate::messages::MessageCatalog;
use crate::shape::EntityShape;

static NULL: Value = Value::Null;

/// Result of running one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Errors(Vec<String>),
    /// Stop the whole validation pass without recording anything.
    Abort,
}

impl Outcome {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Errors(vec![message.into()])
    }

    pub fn from_messages(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Errors(messages)
        }
    }

    pub fn is_pass(&self) -> bool {
        match self {
            Outcome::Pass => true,
            Outcome::Errors(messages) => messages.is_empty(),
            Outcome::Abort => false,
        }
    }
}

impl From<Option<String>> for Outcome {
    fn from(message: Option<String>) -> Self {
        message.map_or(Outcome::Pass, Outcome::error)
    }
}

/// Scalar values of an ancestor entity, captured before its children are
/// visited. This is how a nested entity's checks see their parent without
/// holding a reference into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entity: String,
    values: IndexMap<String, Value>,
}

impl Snapshot {
    pub fn capture(entity: &dyn Entity, shape: &EntityShape) -> Self {
        let values = shape
            .snapshot_fields()
            .map(|field| (field.to_string(), entity.get(field)))
            .collect();
        Self {
            entity: shape.name().to_string(),
            values,
        }
    }

    /// Name of the entity type the snapshot was taken from.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }
}

/// Everything a check may look at.
pub struct CheckInput<'a> {
    pub field: &'a str,
    pub label: &'a str,
    pub value: &'a Value,
    pub scope: Scope,
    pub entity: &'a dyn Entity,
    /// Ancestor snapshots, root first.
    pub lineage: &'a [Snapshot],
    pub messages: &'a MessageCatalog,
}

impl<'a> CheckInput<'a> {
    /// Current value of another field of the same entity.
    pub fn sibling(&self, field: &str) -> Value {
        self.entity.get(field)
    }

    pub fn label_of(&self, field: &str) -> String {
        self.entity.shape().label(field).to_string()
    }

    /// Snapshot of the directly enclosing entity, if any.
    pub fn parent(&self) -> Option<&'a Snapshot> {
        self.lineage.last()
    }

    /// Ancestor snapshots, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Snapshot> {
        self.lineage.iter().rev()
    }

    /// Renders the catalog template `name` with `params`; `label`, `field`
    /// and `value` are always available to the template.
    pub fn message(&self, name: &str, params: Value) -> Result<String, ConfigError> {
        let mut context = match params {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        context.entry("label").or_insert_with(|| json!(self.label));
        context.entry("field").or_insert_with(|| json!(self.field));
        context
            .entry("value")
            .or_insert_with(|| json!(crate::checks::display(self.value)));
        self.messages.render(name, &Value::Object(context))
    }
}

/// A registered check.
///
/// `prepare` runs once per declared rule when the entity shape is built, so
/// argument mistakes surface at registration rather than mid-validation.
pub trait Check: Send + Sync {
    fn prepare(&self, _args: &[Value]) -> Result<(), ConfigError> {
        Ok(())
    }

    fn run(&self, input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome>;
}

impl<F> Check for F
where
    F: Fn(&CheckInput<'_>, &[Value]) -> anyhow::Result<Outcome> + Send + Sync,
{
    fn run(&self, input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
        self(input, args)
    }
}

/// Pins a closure to the check signature so argument and error types infer.
pub fn check_fn<F>(f: F) -> F
where
    F: Fn(&CheckInput<'_>, &[Value]) -> anyhow::Result<Outcome> + Send + Sync,
{
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_messages() {
        assert_eq!(Outcome::from_messages(Vec::new()), Outcome::Pass);
        assert_eq!(
            Outcome::from_messages(vec!["bad".to_string()]),
            Outcome::error("bad")
        );
        assert!(Outcome::Errors(Vec::new()).is_pass());
        assert!(!Outcome::Abort.is_pass());
    }

    #[test]
    fn test_outcome_from_option() {
        assert_eq!(Outcome::from(None), Outcome::Pass);
        assert_eq!(Outcome::from(Some("x".to_string())), Outcome::error("x"));
    }
}
