// rulegate-core/src/rule.rs
//! Rule declarations.
//!
//! A [`RuleDecl`] names its check by id and is what entity builders and the
//! YAML loader produce. [`CheckRegistry::resolve`](crate::CheckRegistry::resolve)
//! turns it into a [`Rule`] bound to the registered check.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::check::Check;
use crate::errors::ConfigError;
use crate::flags::{Control, Scope, ScopeNames};

/// An unresolved rule: check id, arguments, scope and control flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDecl {
    pub check: String,
    pub args: Vec<Value>,
    pub scope: Scope,
    pub control: Control,
}

impl RuleDecl {
    pub fn new(check: impl Into<String>, scope: Scope) -> Self {
        Self {
            check: check.into(),
            args: Vec::new(),
            scope,
            control: Control::NONE,
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn control(mut self, control: Control) -> Self {
        self.control |= control;
        self
    }

    /// Parses the sequence form `[check, "scope|control", args...]`.
    ///
    /// `field` and `index` only feed error messages.
    pub fn from_values(
        field: &str,
        index: usize,
        parts: &[Value],
        names: &ScopeNames,
    ) -> Result<Self, ConfigError> {
        if parts.len() < 2 {
            return Err(ConfigError::RuleArity {
                field: field.to_string(),
                index,
                len: parts.len(),
            });
        }
        let check = parts[0].as_str().ok_or_else(|| ConfigError::RuleCheckId {
            field: field.to_string(),
            index,
        })?;
        let (scope, control) = match &parts[1] {
            Value::String(expr) => names.parse_flags(expr)?,
            other => return Err(ConfigError::UnknownFlag(other.to_string())),
        };

        Ok(Self {
            check: check.to_string(),
            args: parts[2..].to_vec(),
            scope,
            control,
        })
    }
}

/// A rule bound to its check. Cheap to clone.
#[derive(Clone)]
pub struct Rule {
    decl: RuleDecl,
    check: Arc<dyn Check>,
}

impl Rule {
    pub(crate) fn new(decl: RuleDecl, check: Arc<dyn Check>) -> Self {
        Self { decl, check }
    }

    pub fn check_id(&self) -> &str {
        &self.decl.check
    }

    pub fn args(&self) -> &[Value] {
        &self.decl.args
    }

    pub fn scope(&self) -> Scope {
        self.decl.scope
    }

    pub fn control(&self) -> Control {
        self.decl.control
    }

    pub fn decl(&self) -> &RuleDecl {
        &self.decl
    }

    pub(crate) fn check(&self) -> &dyn Check {
        self.check.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("check", &self.decl.check)
            .field("args", &self.decl.args)
            .field("scope", &self.decl.scope)
            .field("control", &self.decl.control)
            .finish()
    }
}
