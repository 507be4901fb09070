// rulegate-core/src/record.rs
//! `Record`: a dynamic entity backed by a shape and a value map.
//!
//! Records are what the YAML schema and the headless helpers produce. Any
//! declared scalar field (or rule key) can be set; nested children are
//! created from the shape's nested declarations.

use std::sync::Arc;

use anyhow::bail;
use indexmap::IndexMap;
use serde_json::Value;

use crate::binder::{self, DefaultConverter};
use crate::entity::Entity;
use crate::shape::{EntityShape, Nesting};

#[derive(Debug, Clone)]
pub struct Record {
    shape: Arc<EntityShape>,
    values: IndexMap<String, Value>,
    one: IndexMap<String, Record>,
    many: IndexMap<String, Vec<Record>>,
}

impl Record {
    pub fn new(shape: Arc<EntityShape>) -> Self {
        Self {
            shape,
            values: IndexMap::new(),
            one: IndexMap::new(),
            many: IndexMap::new(),
        }
    }

    /// Builds a record and populates it from a JSON object.
    pub fn from_json(shape: Arc<EntityShape>, source: &Value) -> anyhow::Result<Self> {
        let mut record = Self::new(shape);
        binder::populate(&mut record, source, &DefaultConverter)?;
        Ok(record)
    }

    /// The record and its children as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(binder::export(self, &DefaultConverter))
    }

    /// Scalar values set so far.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    fn nested_decl(&self, field: &str, nesting: Nesting) -> Option<Arc<EntityShape>> {
        self.shape
            .nested_decl(field)
            .filter(|decl| decl.nesting == nesting)
            .map(|decl| Arc::clone(&decl.shape))
    }
}

impl Entity for Record {
    fn shape(&self) -> Arc<EntityShape> {
        Arc::clone(&self.shape)
    }

    fn get(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or(Value::Null)
    }

    fn set(&mut self, field: &str, value: Value) -> anyhow::Result<()> {
        if !self.shape.has_field(field) {
            bail!("entity '{}' has no field '{}'", self.shape.name(), field);
        }
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    fn child(&self, field: &str) -> Option<&dyn Entity> {
        self.one.get(field).map(|record| record as &dyn Entity)
    }

    fn child_mut(&mut self, field: &str) -> Option<&mut dyn Entity> {
        self.one.get_mut(field).map(|record| record as &mut dyn Entity)
    }

    fn children(&self, field: &str) -> Vec<&dyn Entity> {
        self.many
            .get(field)
            .map(|records| records.iter().map(|r| r as &dyn Entity).collect())
            .unwrap_or_default()
    }

    fn children_mut(&mut self, field: &str) -> Vec<&mut dyn Entity> {
        self.many
            .get_mut(field)
            .map(|records| records.iter_mut().map(|r| r as &mut dyn Entity).collect())
            .unwrap_or_default()
    }

    fn reset_child(&mut self, field: &str) -> Option<&mut dyn Entity> {
        let shape = self.nested_decl(field, Nesting::One)?;
        self.one.insert(field.to_string(), Record::new(shape));
        self.child_mut(field)
    }

    fn push_child(&mut self, field: &str) -> Option<&mut dyn Entity> {
        let shape = self.nested_decl(field, Nesting::Many)?;
        let records = self.many.entry(field.to_string()).or_default();
        records.push(Record::new(shape));
        records.last_mut().map(|r| r as &mut dyn Entity)
    }

    fn clear_children(&mut self, field: &str) {
        if let Some(records) = self.many.get_mut(field) {
            records.clear();
        }
    }
}
