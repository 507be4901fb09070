// rulegate-core/src/entity.rs
//! The `Entity` trait: what the validator and the binder need from a value.
//!
//! Only `shape` and `get` are mandatory. Entities without nested children
//! or lifecycle hooks can rely on the default methods.

use std::sync::Arc;

use anyhow::bail;
use serde_json::Value;

use crate::flags::Scope;
use crate::shape::EntityShape;
use crate::tree::ErrorMap;

pub trait Entity {
    fn shape(&self) -> Arc<EntityShape>;

    /// Current value of a scalar field; `Value::Null` when unset.
    fn get(&self, field: &str) -> Value;

    fn set(&mut self, field: &str, _value: Value) -> anyhow::Result<()> {
        bail!("entity '{}' does not accept a value for '{}'", self.shape().name(), field)
    }

    /// The single nested entity stored under `field`, if present.
    fn child(&self, _field: &str) -> Option<&dyn Entity> {
        None
    }

    fn child_mut(&mut self, _field: &str) -> Option<&mut dyn Entity> {
        None
    }

    /// Elements of the entity list stored under `field`, in order.
    fn children(&self, _field: &str) -> Vec<&dyn Entity> {
        Vec::new()
    }

    fn children_mut(&mut self, _field: &str) -> Vec<&mut dyn Entity> {
        Vec::new()
    }

    /// Replaces the single nested entity under `field` with a fresh one and
    /// returns it.
    fn reset_child(&mut self, _field: &str) -> Option<&mut dyn Entity> {
        None
    }

    /// Appends a fresh element to the list under `field` and returns it.
    fn push_child(&mut self, _field: &str) -> Option<&mut dyn Entity> {
        None
    }

    fn clear_children(&mut self, _field: &str) {}

    /// Runs before any rule of this entity.
    fn before(&mut self, _scope: Scope) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the entity and its children validated without errors.
    fn complete(&mut self, _scope: Scope) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the entity or one of its children failed. `errors` holds
    /// only the entries at or under this entity.
    fn failed(&mut self, _errors: &ErrorMap, _scope: Scope) -> anyhow::Result<()> {
        Ok(())
    }
}
