// rulegate-core/src/tree.rs
//! Recursive validation of an entity graph.
//!
//! [`Validator`] walks an entity, its single nested entities and its entity
//! lists, running every declared rule list through the [`RuleEngine`] and
//! collecting failures into an [`ErrorMap`] keyed by path:
//!
//! | location                         | key                  |
//! |----------------------------------|----------------------|
//! | root field                       | `name`               |
//! | field of nested `address`        | `address[city]`      |
//! | field of element 1 of `items`    | `items[1][qty]`      |
//!
//! Lifecycle hooks run once per visited entity: `before` first, then either
//! `failed` or `complete` once the entity's subtree is done. An `Abort`
//! outcome anywhere ends the walk at once; no further hooks run and the
//! errors gathered so far are kept.

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::check::Snapshot;
use crate::engine::{Flow, RuleEngine};
use crate::entity::Entity;
use crate::errors::ValidateError;
use crate::flags::Scope;
use crate::messages::MessageCatalog;
use crate::shape::Nesting;

/// Validation messages keyed by path, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(IndexMap<String, Vec<String>>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// True when `key` itself holds at least one message.
    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|messages| !messages.is_empty())
    }

    pub fn push(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(message.into());
    }

    pub fn extend_at<I>(&mut self, key: &str, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut messages = messages.into_iter().peekable();
        if messages.peek().is_none() {
            return;
        }
        match self.0.get_mut(key) {
            Some(existing) => existing.extend(messages),
            None => {
                self.0.insert(key.to_string(), messages.collect());
            }
        }
    }

    /// True when `prefix` or any key below it holds messages. The empty
    /// prefix covers every key.
    pub fn has_under(&self, prefix: &str) -> bool {
        self.0
            .iter()
            .any(|(key, messages)| !messages.is_empty() && is_under(key, prefix))
    }

    /// The entries at or below `prefix`.
    pub fn subtree(&self, prefix: &str) -> ErrorMap {
        ErrorMap(
            self.0
                .iter()
                .filter(|(key, _)| is_under(key, prefix))
                .map(|(key, messages)| (key.clone(), messages.clone()))
                .collect(),
        )
    }

    /// Appends every message of `other`, keeping first-seen key order.
    pub fn merge(&mut self, other: ErrorMap) {
        for (key, messages) in other.0 {
            self.extend_at(&key, messages);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.0
    }
}

impl From<IndexMap<String, Vec<String>>> for ErrorMap {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        ErrorMap(map)
    }
}

impl IntoIterator for ErrorMap {
    type Item = (String, Vec<String>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn is_under(key: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || key == prefix
        || key.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('['))
}

/// Key of `field` inside the entity whose own key is `prefix`.
pub fn path_key(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}[{}]", prefix, field)
    }
}

/// Key of element `index` of the list whose key is `list_key`.
pub fn element_key(list_key: &str, index: usize) -> String {
    format!("{}[{}]", list_key, index)
}

/// State of one validation call.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub scope: Scope,
    pub errors: ErrorMap,
}

impl ValidationContext {
    pub fn new(scope: Scope) -> Self {
        Self::seeded(scope, ErrorMap::new())
    }

    pub fn seeded(scope: Scope, errors: ErrorMap) -> Self {
        Self { scope, errors }
    }
}

/// Outcome of [`Validator::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: ErrorMap,
    /// True when a check aborted the walk.
    pub aborted: bool,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Walks entity graphs with a fixed message catalog.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    messages: MessageCatalog,
}

impl Validator {
    pub fn new(messages: MessageCatalog) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// Validates `entity` under `scope` and returns the error map.
    pub fn validate(&self, entity: &mut dyn Entity, scope: Scope) -> Result<ErrorMap, ValidateError> {
        Ok(self.run(entity, scope, ErrorMap::new())?.errors)
    }

    /// Like [`validate`](Self::validate), starting from errors recorded by an
    /// earlier step.
    pub fn validate_with(
        &self,
        entity: &mut dyn Entity,
        scope: Scope,
        seed: ErrorMap,
    ) -> Result<ErrorMap, ValidateError> {
        Ok(self.run(entity, scope, seed)?.errors)
    }

    pub fn run(
        &self,
        entity: &mut dyn Entity,
        scope: Scope,
        seed: ErrorMap,
    ) -> Result<ValidationReport, ValidateError> {
        let mut ctx = ValidationContext::seeded(scope, seed);
        let mut lineage = Vec::new();
        let engine = RuleEngine::new(&self.messages);

        let flow = visit(&engine, entity, "", &mut lineage, &mut ctx)?;
        let aborted = flow == Flow::Abort;
        debug!(
            "Validation finished with {} failing key(s){}.",
            ctx.errors.len(),
            if aborted { " (aborted)" } else { "" }
        );
        Ok(ValidationReport {
            errors: ctx.errors,
            aborted,
        })
    }
}

/// Validates `entity` with the default message catalog.
pub fn validate(entity: &mut dyn Entity, scope: Scope) -> Result<ErrorMap, ValidateError> {
    Validator::default().validate(entity, scope)
}

fn visit(
    engine: &RuleEngine<'_>,
    entity: &mut dyn Entity,
    prefix: &str,
    lineage: &mut Vec<Snapshot>,
    ctx: &mut ValidationContext,
) -> Result<Flow, ValidateError> {
    let shape = entity.shape();
    trace!("Visiting '{}' at '{}'.", shape.name(), prefix);

    entity
        .before(ctx.scope)
        .map_err(ValidateError::from_collaborator)?;

    for (field, rules) in shape.rules() {
        let key = path_key(prefix, field);
        if engine.run_field(field, rules, &*entity, lineage, &key, ctx)? == Flow::Abort {
            return Ok(Flow::Abort);
        }
    }

    if !shape.nested().is_empty() {
        lineage.push(Snapshot::capture(&*entity, &shape));
        let flow = visit_children(engine, entity, prefix, lineage, ctx);
        lineage.pop();
        if flow? == Flow::Abort {
            return Ok(Flow::Abort);
        }
    }

    let own = ctx.errors.subtree(prefix);
    let hook = if own.is_empty() {
        entity.complete(ctx.scope)
    } else {
        entity.failed(&own, ctx.scope)
    };
    hook.map_err(ValidateError::from_collaborator)?;

    Ok(Flow::Continue)
}

fn visit_children(
    engine: &RuleEngine<'_>,
    entity: &mut dyn Entity,
    prefix: &str,
    lineage: &mut Vec<Snapshot>,
    ctx: &mut ValidationContext,
) -> Result<Flow, ValidateError> {
    let shape = entity.shape();
    for decl in shape.nested() {
        let key = path_key(prefix, &decl.field);
        match decl.nesting {
            Nesting::One => {
                if let Some(child) = entity.child_mut(&decl.field) {
                    if visit(engine, child, &key, lineage, ctx)? == Flow::Abort {
                        return Ok(Flow::Abort);
                    }
                }
            }
            Nesting::Many => {
                for (index, child) in entity.children_mut(&decl.field).into_iter().enumerate() {
                    let child_key = element_key(&key, index);
                    if visit(engine, child, &child_key, lineage, ctx)? == Flow::Abort {
                        return Ok(Flow::Abort);
                    }
                }
            }
        }
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_keys() {
        assert_eq!(path_key("", "name"), "name");
        assert_eq!(path_key("address", "city"), "address[city]");
        assert_eq!(path_key(&element_key("items", 0), "qty"), "items[0][qty]");
    }

    #[test]
    fn test_subtree_respects_segment_boundaries() {
        let mut errors = ErrorMap::new();
        errors.push("items[1][qty]", "bad");
        errors.push("items[10][qty]", "bad");
        errors.push("items_total", "bad");
        let sub = errors.subtree("items[1]");
        assert_eq!(sub.keys().collect::<Vec<_>>(), ["items[1][qty]"]);
        assert!(errors.has_under("items"));
        assert!(!errors.has_under("item"));
        assert_eq!(errors.subtree("").len(), 3);
    }

    #[test]
    fn test_extend_at_ignores_empty_batches() {
        let mut errors = ErrorMap::new();
        errors.extend_at("name", Vec::new());
        assert!(errors.is_empty());
        errors.extend_at("name", vec!["a".to_string()]);
        errors.extend_at("name", vec!["b".to_string()]);
        assert_eq!(errors.get("name").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_error_map_serializes_as_object() {
        let mut errors = ErrorMap::new();
        errors.push("name", "name is required");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"name":["name is required"]}"#);
    }
}
