//! errors.rs - Custom error types for the rulegate-core library.
//!
//! Validation failures are never errors: they are returned as data in an
//! `ErrorMap`. The types here cover the two other kinds of failure. A
//! `ConfigError` means an entity declaration must be fixed; a collaborator
//! error is whatever a check, hook or setter raised, passed through untouched.
//!
//! License: MIT OR APACHE 2.0

use rulegate_fuzzy::FuzzyError;
use thiserror::Error;

/// Declaration mistakes, raised at registration time or as soon as they are
/// observed. Never recorded as a validation message.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Rule #{index} for field '{field}' has {len} element(s); a check id and a scope are required")]
    RuleArity { field: String, index: usize, len: usize },

    #[error("Rule #{index} for field '{field}' must start with a check id string")]
    RuleCheckId { field: String, index: usize },

    #[error("Unknown check '{check}' declared for field '{field}'")]
    UnknownCheck { field: String, check: String },

    #[error("Unknown scope or control flag '{0}'")]
    UnknownFlag(String),

    #[error("Rule '{check}' for field '{field}' does not name any scope")]
    EmptyScope { field: String, check: String },

    #[error("Scope '{name}' has value {value}, which is not a single power of two")]
    ScopeNotPowerOfTwo { name: String, value: u32 },

    #[error("Scope '{0}' collides with a built-in scope or control flag name")]
    ReservedScope(String),

    #[error("Scope '{name}' reuses bit value {value} already taken by scope '{taken_by}'")]
    ScopeBitTaken {
        name: String,
        value: u32,
        taken_by: String,
    },

    #[error("Check '{check}' received invalid arguments: {reason}")]
    InvalidArgs { check: String, reason: String },

    #[error("Entity '{entity}' references unknown entity '{target}'")]
    UnknownEntity { entity: String, target: String },

    #[error("Entity '{0}' is not declared in the schema")]
    UndeclaredEntity(String),

    #[error("Entity '{0}' is part of a reference cycle")]
    CyclicShape(String),

    #[error("Entity '{entity}' declares field '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    #[error("Message template '{name}' is invalid: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("No message template is registered for '{0}'")]
    MissingTemplate(String),

    #[error(transparent)]
    Word(#[from] FuzzyError),
}

/// Failure of a `validate` call.
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raised by a check function or lifecycle hook; carried unchanged.
    #[error(transparent)]
    Collaborator(anyhow::Error),
}

impl ValidateError {
    /// Sorts an error coming out of a check or hook: declaration mistakes stay
    /// configuration errors, anything else belongs to the collaborator.
    pub(crate) fn from_collaborator(err: anyhow::Error) -> Self {
        match err.downcast::<ConfigError>() {
            Ok(config) => ValidateError::Config(config),
            Err(other) => ValidateError::Collaborator(other),
        }
    }
}
