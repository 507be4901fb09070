// rulegate-core/src/flags.rs
//! Scope and control bit sets.
//!
//! A scope selects the operation a rule applies to (create, update, ...);
//! control flags alter short-circuiting inside one field's rule list. They
//! are separate types so a control bit can never leak into a scope test.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use indexmap::IndexMap;

use crate::errors::ConfigError;

/// Combinable operation scopes. Every named scope is a single bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scope(u32);

impl Scope {
    pub const NONE: Scope = Scope(0);
    pub const CREATE: Scope = Scope(1);
    pub const READ: Scope = Scope(1 << 1);
    pub const UPDATE: Scope = Scope(1 << 2);
    pub const DELETE: Scope = Scope(1 << 3);
    /// `CREATE | UPDATE`.
    pub const SAVE: Scope = Scope(1 | 1 << 2);
    pub const ALL: Scope = Scope(u32::MAX);

    /// A custom single-bit scope.
    pub fn custom(name: &str, value: u32) -> Result<Scope, ConfigError> {
        if !value.is_power_of_two() {
            return Err(ConfigError::ScopeNotPowerOfTwo {
                name: name.to_string(),
                value,
            });
        }
        Ok(Scope(value))
    }

    /// A raw mask; any combination of single-bit scopes.
    pub const fn from_bits(bits: u32) -> Scope {
        Scope(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when the two sets share at least one bit.
    pub const fn intersects(self, other: Scope) -> bool {
        self.0 & other.0 != 0
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({:#b})", self.0)
    }
}

impl BitOr for Scope {
    type Output = Scope;

    fn bitor(self, rhs: Scope) -> Scope {
        Scope(self.0 | rhs.0)
    }
}

impl BitOrAssign for Scope {
    fn bitor_assign(&mut self, rhs: Scope) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Scope {
    type Output = Scope;

    fn bitand(self, rhs: Scope) -> Scope {
        Scope(self.0 & rhs.0)
    }
}

/// Short-circuit flags for one rule.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Control(u8);

impl Control {
    pub const NONE: Control = Control(0);
    /// Stop the field's remaining rules when this rule fails.
    pub const EXIT_ON_FAILURE: Control = Control(1);
    /// Stop the field's remaining rules when this rule passes.
    pub const EXIT_ON_SUCCESS: Control = Control(1 << 1);
    /// Skip this rule, and the rest of the field, when the field already has errors.
    pub const EXIT_IF_ALREADY_ERRORED: Control = Control(1 << 2);

    pub const fn contains(self, other: Control) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = CONTROL_NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        write!(f, "Control({})", names.join("|"))
    }
}

impl BitOr for Control {
    type Output = Control;

    fn bitor(self, rhs: Control) -> Control {
        Control(self.0 | rhs.0)
    }
}

impl BitOrAssign for Control {
    fn bitor_assign(&mut self, rhs: Control) {
        self.0 |= rhs.0;
    }
}

const CONTROL_NAMES: [(&str, Control); 3] = [
    ("exit_on_failure", Control::EXIT_ON_FAILURE),
    ("exit_on_success", Control::EXIT_ON_SUCCESS),
    ("exit_if_already_errored", Control::EXIT_IF_ALREADY_ERRORED),
];

/// Names usable in flag expressions such as `"save|exit_on_failure"`.
#[derive(Debug, Clone)]
pub struct ScopeNames {
    names: IndexMap<String, Scope>,
}

impl Default for ScopeNames {
    fn default() -> Self {
        let names = [
            ("create", Scope::CREATE),
            ("read", Scope::READ),
            ("update", Scope::UPDATE),
            ("delete", Scope::DELETE),
            ("save", Scope::SAVE),
            ("all", Scope::ALL),
        ]
        .into_iter()
        .map(|(name, scope)| (name.to_string(), scope))
        .collect();
        Self { names }
    }
}

impl ScopeNames {
    /// Registers a custom scope name with a single-bit value.
    pub fn define(&mut self, name: &str, value: u32) -> Result<Scope, ConfigError> {
        let key = name.trim().to_ascii_lowercase();
        if self.names.contains_key(&key) || CONTROL_NAMES.iter().any(|(n, _)| *n == key) {
            return Err(ConfigError::ReservedScope(key));
        }
        let scope = Scope::custom(&key, value)?;
        let taken = self
            .names
            .iter()
            .find(|(_, existing)| **existing != Scope::ALL && existing.intersects(scope));
        if let Some((taken_by, _)) = taken {
            return Err(ConfigError::ScopeBitTaken {
                name: key,
                value,
                taken_by: taken_by.clone(),
            });
        }
        self.names.insert(key, scope);
        Ok(scope)
    }

    pub fn get(&self, name: &str) -> Option<Scope> {
        self.names.get(&name.trim().to_ascii_lowercase()).copied()
    }

    /// Parses an expression made only of scope names.
    pub fn parse_scope(&self, expr: &str) -> Result<Scope, ConfigError> {
        let (scope, control) = self.parse_flags(expr)?;
        if !control.is_empty() {
            return Err(ConfigError::UnknownFlag(expr.to_string()));
        }
        Ok(scope)
    }

    /// Parses a mixed expression of scope names and control flags separated
    /// by `|` or `,`.
    pub fn parse_flags(&self, expr: &str) -> Result<(Scope, Control), ConfigError> {
        let mut scope = Scope::NONE;
        let mut control = Control::NONE;

        for token in expr.split(['|', ',']).map(str::trim).filter(|t| !t.is_empty()) {
            let token = token.to_ascii_lowercase();
            if let Some(named) = self.names.get(&token) {
                scope |= *named;
            } else if let Some((_, flag)) = CONTROL_NAMES.iter().find(|(n, _)| *n == token) {
                control |= *flag;
            } else {
                return Err(ConfigError::UnknownFlag(token));
            }
        }
        Ok((scope, control))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_is_create_or_update() {
        assert_eq!(Scope::SAVE, Scope::CREATE | Scope::UPDATE);
        assert!(Scope::SAVE.intersects(Scope::UPDATE));
        assert!(!Scope::SAVE.intersects(Scope::DELETE));
    }

    #[test]
    fn test_custom_scope_must_be_power_of_two() {
        assert!(Scope::custom("publish", 16).is_ok());
        assert!(matches!(
            Scope::custom("publish", 12),
            Err(ConfigError::ScopeNotPowerOfTwo { value: 12, .. })
        ));
        assert!(Scope::custom("none", 0).is_err());
    }

    #[test]
    fn test_parse_flags_splits_scope_and_control() {
        let names = ScopeNames::default();
        let (scope, control) = names.parse_flags("create | UPDATE|exit_on_failure").unwrap();
        assert_eq!(scope, Scope::SAVE);
        assert!(control.contains(Control::EXIT_ON_FAILURE));
        assert!(!control.contains(Control::EXIT_ON_SUCCESS));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let names = ScopeNames::default();
        assert!(matches!(names.parse_flags("save|sometimes"), Err(ConfigError::UnknownFlag(_))));
        assert!(names.parse_scope("save|exit_on_failure").is_err());
    }

    #[test]
    fn test_define_custom_scope() {
        let mut names = ScopeNames::default();
        let publish = names.define("publish", 1 << 8).unwrap();
        assert_eq!(names.parse_scope("publish").unwrap(), publish);
        assert!(matches!(names.define("save", 1 << 9), Err(ConfigError::ReservedScope(_))));
    }

    #[test]
    fn test_custom_scope_must_use_a_free_bit() {
        let mut names = ScopeNames::default();
        assert!(matches!(
            names.define("publish", 1),
            Err(ConfigError::ScopeBitTaken { value: 1, ref taken_by, .. }) if taken_by == "create"
        ));
        assert!(names.get("publish").is_none());

        names.define("publish", 16).unwrap();
        assert!(matches!(
            names.define("archive", 16),
            Err(ConfigError::ScopeBitTaken { ref taken_by, .. }) if taken_by == "publish"
        ));
    }
}
