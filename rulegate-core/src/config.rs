// rulegate-core/src/config.rs
//! YAML schema loading.
//!
//! A schema file declares custom scopes, an optional banned-word policy,
//! message overrides and the entity types themselves:
//!
//! ```yaml
//! scopes:
//!   publish: 16
//! messages:
//!   required: "{label} cannot be empty"
//! entities:
//!   order:
//!     fields: [reference, note]
//!     labels:
//!       reference: Order reference
//!     rules:
//!       reference:
//!         - [required, "save|exit_on_failure"]
//!         - [max_length, save, 12]
//!     many:
//!       items: line_item
//!   line_item:
//!     fields: [sku, qty]
//!     rules:
//!       qty:
//!         - [min, save, 1]
//! ```
//!
//! [`SchemaConfig::build`] resolves every entity (children first), rejects
//! reference cycles and returns an immutable [`Schema`].
//!
//! License: MIT OR APACHE 2.0

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use rulegate_fuzzy::MatchPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConfigError;
use crate::flags::{Scope, ScopeNames};
use crate::messages::MessageCatalog;
use crate::record::Record;
use crate::registry::CheckRegistry;
use crate::rule::RuleDecl;
use crate::shape::EntityShape;
use crate::tree::Validator;

/// The on-disk schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Custom scope names; each value must be a single power of two.
    #[serde(default)]
    pub scopes: IndexMap<String, u32>,
    /// Policy for the `banned_words` check.
    #[serde(default)]
    pub policy: Option<MatchPolicy>,
    /// Message template overrides, keyed by check id.
    #[serde(default)]
    pub messages: IndexMap<String, String>,
    #[serde(default)]
    pub entities: IndexMap<String, EntityConfig>,
}

/// One entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
    /// `field: [[check, "scope|control", args...], ...]`
    #[serde(default)]
    pub rules: IndexMap<String, Vec<Vec<Value>>>,
    /// Single nested entities: field → entity name.
    #[serde(default)]
    pub one: IndexMap<String, String>,
    /// Entity lists: field → element entity name.
    #[serde(default)]
    pub many: IndexMap<String, String>,
}

impl SchemaConfig {
    /// Loads a schema from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading schema from: {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let config: SchemaConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse schema file {}", path.display()))?;
        info!("Loaded {} entity declaration(s) from {}.", config.entities.len(), path.display());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yml::from_str(text).context("Failed to parse schema")
    }

    /// Resolves the schema against the built-in checks, using `policy` for
    /// `banned_words` when one is given.
    pub fn build(&self) -> Result<Schema, ConfigError> {
        let registry = match &self.policy {
            Some(policy) => CheckRegistry::with_word_policy(policy.clone())?,
            None => CheckRegistry::with_builtins(),
        };
        self.build_with(&registry)
    }

    /// Resolves the schema against `registry`. The `policy` section is not
    /// consulted; the registry's own `banned_words` check is used as is.
    pub fn build_with(&self, registry: &CheckRegistry) -> Result<Schema, ConfigError> {
        let mut names = ScopeNames::default();
        for (name, value) in &self.scopes {
            names.define(name, *value)?;
        }
        let messages = MessageCatalog::with_overrides(
            self.messages.iter().map(|(name, text)| (name.clone(), text.clone())),
        )?;

        let mut resolver = Resolver {
            config: self,
            registry,
            names: &names,
            built: IndexMap::new(),
            visiting: Vec::new(),
        };
        for name in self.entities.keys() {
            resolver.resolve(name)?;
        }
        let shapes = resolver.built;
        debug!("Schema built with {} entity shape(s).", shapes.len());

        Ok(Schema {
            names,
            shapes,
            messages,
        })
    }
}

struct Resolver<'a> {
    config: &'a SchemaConfig,
    registry: &'a CheckRegistry,
    names: &'a ScopeNames,
    built: IndexMap<String, Arc<EntityShape>>,
    visiting: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Arc<EntityShape>, ConfigError> {
        if let Some(shape) = self.built.get(name) {
            return Ok(Arc::clone(shape));
        }
        if self.visiting.iter().any(|v| v == name) {
            return Err(ConfigError::CyclicShape(name.to_string()));
        }
        let entity = self
            .config
            .entities
            .get(name)
            .ok_or_else(|| ConfigError::UndeclaredEntity(name.to_string()))?;
        self.visiting.push(name.to_string());

        let mut builder = EntityShape::builder(name).fields(entity.fields.iter().cloned());
        for (field, label) in &entity.labels {
            builder = builder.label(field, label);
        }
        for (field, rules) in &entity.rules {
            for (index, parts) in rules.iter().enumerate() {
                builder = builder.rule(field, RuleDecl::from_values(field, index, parts, self.names)?);
            }
        }
        for (field, target) in &entity.one {
            builder = builder.one(field, self.child(name, target)?);
        }
        for (field, target) in &entity.many {
            builder = builder.many(field, self.child(name, target)?);
        }

        self.visiting.pop();
        let shape = Arc::new(builder.build(self.registry)?);
        self.built.insert(name.to_string(), Arc::clone(&shape));
        Ok(shape)
    }

    fn child(&mut self, entity: &str, target: &str) -> Result<Arc<EntityShape>, ConfigError> {
        if !self.config.entities.contains_key(target) {
            return Err(ConfigError::UnknownEntity {
                entity: entity.to_string(),
                target: target.to_string(),
            });
        }
        self.resolve(target)
    }
}

/// A built schema: resolved shapes, scope names and messages.
#[derive(Debug, Clone)]
pub struct Schema {
    names: ScopeNames,
    shapes: IndexMap<String, Arc<EntityShape>>,
    messages: MessageCatalog,
}

impl Schema {
    pub fn shape(&self, entity: &str) -> Option<Arc<EntityShape>> {
        self.shapes.get(entity).cloned()
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// An empty record of type `entity`.
    pub fn record(&self, entity: &str) -> Result<Record, ConfigError> {
        self.shape(entity)
            .map(Record::new)
            .ok_or_else(|| ConfigError::UndeclaredEntity(entity.to_string()))
    }

    pub fn scope_names(&self) -> &ScopeNames {
        &self.names
    }

    /// Parses a scope expression such as `"create|publish"`.
    pub fn parse_scope(&self, expr: &str) -> Result<Scope, ConfigError> {
        self.names.parse_scope(expr)
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// A validator using this schema's messages.
    pub fn validator(&self) -> Validator {
        Validator::new(self.messages.clone())
    }
}
