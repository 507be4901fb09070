// rulegate-core/src/shape.rs
//! Per-type entity declarations.
//!
//! An [`EntityShape`] lists an entity type's scalar fields, their labels,
//! the ordered rules per field and the nested entities it owns. Shapes are
//! built once through [`ShapeBuilder`], which resolves every rule against a
//! [`CheckRegistry`], and are then shared read-only behind an `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;

use crate::errors::ConfigError;
use crate::registry::CheckRegistry;
use crate::rule::{Rule, RuleDecl};

/// Cardinality of a nested entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    One,
    Many,
}

#[derive(Debug, Clone)]
pub struct NestedDecl {
    pub field: String,
    pub nesting: Nesting,
    pub shape: Arc<EntityShape>,
}

#[derive(Debug)]
pub struct EntityShape {
    name: String,
    fields: Vec<String>,
    labels: IndexMap<String, String>,
    rules: IndexMap<String, Vec<Rule>>,
    nested: Vec<NestedDecl>,
}

impl EntityShape {
    pub fn builder(name: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder {
            name: name.into(),
            fields: Vec::new(),
            labels: IndexMap::new(),
            rules: IndexMap::new(),
            nested: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared scalar fields, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Label of `field`; the field name itself when none was declared.
    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels.get(field).map(String::as_str).unwrap_or(field)
    }

    /// Rule lists keyed by field, in declaration order. A key need not be a
    /// declared scalar field.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.rules.iter().map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }

    pub fn rules_for(&self, field: &str) -> &[Rule] {
        self.rules.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nested(&self) -> &[NestedDecl] {
        &self.nested
    }

    pub fn nested_decl(&self, field: &str) -> Option<&NestedDecl> {
        self.nested.iter().find(|decl| decl.field == field)
    }

    /// True when `field` is a declared scalar or has rules attached.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field) || self.rules.contains_key(field)
    }

    /// Scalar fields followed by rule keys that are not declared fields.
    pub fn snapshot_fields(&self) -> impl Iterator<Item = &str> {
        let extra = self
            .rules
            .keys()
            .filter(move |key| !self.fields.contains(key));
        self.fields.iter().chain(extra).map(String::as_str)
    }
}

/// Collects a shape declaration; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    name: String,
    fields: Vec<String>,
    labels: IndexMap<String, String>,
    rules: IndexMap<String, Vec<RuleDecl>>,
    nested: Vec<NestedDecl>,
}

impl ShapeBuilder {
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Appends a rule to `field`'s list. Order of calls is execution order.
    pub fn rule(mut self, field: impl Into<String>, rule: RuleDecl) -> Self {
        self.rules.entry(field.into()).or_default().push(rule);
        self
    }

    pub fn rules<I>(mut self, field: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleDecl>,
    {
        self.rules.entry(field.into()).or_default().extend(rules);
        self
    }

    pub fn one(self, field: impl Into<String>, shape: Arc<EntityShape>) -> Self {
        self.nest(field, Nesting::One, shape)
    }

    pub fn many(self, field: impl Into<String>, shape: Arc<EntityShape>) -> Self {
        self.nest(field, Nesting::Many, shape)
    }

    fn nest(mut self, field: impl Into<String>, nesting: Nesting, shape: Arc<EntityShape>) -> Self {
        self.nested.push(NestedDecl {
            field: field.into(),
            nesting,
            shape,
        });
        self
    }

    /// Resolves every rule and checks for duplicate field names.
    pub fn build(self, registry: &CheckRegistry) -> Result<EntityShape, ConfigError> {
        let mut seen = HashSet::new();
        let declared = self
            .fields
            .iter()
            .chain(self.nested.iter().map(|decl| &decl.field));
        for field in declared {
            if !seen.insert(field.as_str()) {
                return Err(ConfigError::DuplicateField {
                    entity: self.name.clone(),
                    field: field.clone(),
                });
            }
        }

        let mut rules = IndexMap::with_capacity(self.rules.len());
        for (field, decls) in self.rules {
            let resolved = decls
                .into_iter()
                .map(|decl| registry.resolve(&field, decl))
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(field, resolved);
        }

        debug!(
            "Built shape '{}' with {} field(s), {} rule list(s), {} nested declaration(s).",
            self.name,
            self.fields.len(),
            rules.len(),
            self.nested.len()
        );

        Ok(EntityShape {
            name: self.name,
            fields: self.fields,
            labels: self.labels,
            rules,
            nested: self.nested,
        })
    }
}
