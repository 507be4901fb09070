// rulegate-core/src/lib.rs
//! # Rulegate Core Library
//!
//! `rulegate-core` validates composite entities against declared, scope-aware
//! rule lists and binds loosely typed data into and out of those entities.
//! Validation failures come back as data: an ordered map from path keys such
//! as `items[0][qty]` to messages.
//!
//! ## Modules
//!
//! * `flags`: `Scope` and `Control` bit sets and their textual names.
//! * `rule`: rule declarations and resolved rules.
//! * `check`: the `Check` trait, `CheckInput` and `Outcome`.
//! * `checks`: the built-in checks (`required`, `max_length`, `banned_words`, ...).
//! * `registry`: check id → check.
//! * `messages`: message templates used by the built-in checks.
//! * `shape`: per-type entity declarations.
//! * `entity`: the `Entity` trait.
//! * `engine`: runs one field's rule list.
//! * `tree`: recursive traversal, `ErrorMap` and `Validator`.
//! * `binder`: populate/inject/describe/export with pluggable converters.
//! * `record`: a dynamic `Entity` implementation.
//! * `config`: YAML schema loading.
//! * `headless`: one-shot helpers.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rulegate_core::{
//!     validate, CheckRegistry, Control, Entity, EntityShape, Record, RuleDecl, Scope,
//! };
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = CheckRegistry::with_builtins();
//!     let shape = EntityShape::builder("user")
//!         .field("name")
//!         .rule("name", RuleDecl::new("required", Scope::SAVE).control(Control::EXIT_ON_FAILURE))
//!         .rule("name", RuleDecl::new("max_length", Scope::SAVE).arg(20))
//!         .build(&registry)?;
//!
//!     let mut user = Record::new(Arc::new(shape));
//!     user.set("name", json!(""))?;
//!
//!     let errors = validate(&mut user, Scope::CREATE)?;
//!     assert_eq!(serde_json::to_value(&errors)?, json!({"name": ["name is required"]}));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Declaration mistakes are `ConfigError`s and are raised when a shape or
//! schema is built. Errors raised by checks, hooks or setters surface
//! unchanged as `ValidateError::Collaborator`.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod binder;
pub mod check;
pub mod checks;
pub mod config;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod flags;
pub mod headless;
pub mod messages;
pub mod record;
pub mod registry;
pub mod rule;
pub mod shape;
pub mod tree;

/// Error types for configuration and validation failures.
pub use errors::{ConfigError, ValidateError};

/// Scope and control flags.
pub use flags::{Control, Scope, ScopeNames};

/// Declaring rules and checks.
pub use check::{check_fn, Check, CheckInput, Outcome, Snapshot};
pub use checks::is_blank;
pub use registry::CheckRegistry;
pub use rule::{Rule, RuleDecl};

/// Entity declarations and the entity trait.
pub use entity::Entity;
pub use record::Record;
pub use shape::{EntityShape, NestedDecl, Nesting, ShapeBuilder};

/// Validation.
pub use engine::{Flow, RuleEngine};
pub use messages::MessageCatalog;
pub use tree::{element_key, path_key, validate, ErrorMap, ValidationContext, ValidationReport, Validator};

/// Value binding.
pub use binder::{
    describe, export, inject, populate, Alias, BindContext, Binding, Converter, DefaultConverter, Exclude,
    Include,
};

/// Schema loading and one-shot helpers.
pub use config::{EntityConfig, Schema, SchemaConfig};
pub use headless::{headless_find_banned, headless_validate_json};

/// The fuzzy matcher used by `banned_words`.
pub use rulegate_fuzzy::{match_any, FuzzyMatcher, MatchPolicy};
