// rulegate-core/src/binder/mod.rs
//! Copies values between loosely typed sources and entities.
//!
//! * [`populate`] fills an entity from a JSON object.
//! * [`inject`] copies an entity into another entity (a destination shape),
//!   writing only fields the destination declares.
//! * [`describe`] is `inject` into a freshly built destination.
//! * [`export`] renders an entity as a JSON object.
//!
//! Every scalar field passes through a [`Converter`], which decides the
//! final value. Nested entities recurse with the same converter; each
//! level's [`BindContext`] points at the enclosing level's source object.

use anyhow::{anyhow, bail};
use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::shape::Nesting;
use crate::tree::{element_key, path_key};

mod converters;

pub use converters::{Alias, DefaultConverter, Exclude, Include};

static NULL: Value = Value::Null;

/// Where in the source tree a binding happens.
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    /// Path key of the entity being bound; empty at the root.
    pub path: &'a str,
    /// Source object of the enclosing level.
    pub parent: Option<&'a Map<String, Value>>,
}

/// The inputs a converter sees for one field.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub field: &'a str,
    /// Whether `source` has a key named `field`.
    pub present: bool,
    pub source: &'a Map<String, Value>,
    /// `source[field]`, or null when absent.
    pub candidate: &'a Value,
    pub context: BindContext<'a>,
    /// The entity's value before binding.
    pub previous: &'a Value,
}

pub trait Converter {
    /// Final value for `binding.field`.
    fn convert(&self, binding: &Binding<'_>) -> Value;

    /// False when `field` must be left alone, including any nested entity
    /// stored under it. `context` is the level `field` belongs to.
    fn descend(&self, _field: &str, _context: &BindContext<'_>) -> bool {
        true
    }
}

/// Fills `entity` from the JSON object `source`.
///
/// Errors raised by [`Entity::set`] are returned unchanged.
pub fn populate(entity: &mut dyn Entity, source: &Value, converter: &dyn Converter) -> anyhow::Result<()> {
    let Value::Object(map) = source else {
        bail!("cannot populate '{}' from {}", entity.shape().name(), kind(source));
    };
    let context = BindContext { path: "", parent: None };
    populate_map(entity, map, converter, context)
}

/// Copies `entity` into `destination` and returns it.
pub fn inject<D: Entity>(entity: &dyn Entity, mut destination: D, converter: &dyn Converter) -> anyhow::Result<D> {
    let source = export(entity, &DefaultConverter);
    let context = BindContext { path: "", parent: None };
    populate_map(&mut destination, &source, converter, context)?;
    Ok(destination)
}

/// [`inject`] into the destination built by `factory`.
pub fn describe<D, F>(entity: &dyn Entity, factory: F, converter: &dyn Converter) -> anyhow::Result<D>
where
    D: Entity,
    F: FnOnce() -> D,
{
    inject(entity, factory(), converter)
}

/// Renders `entity` and its nested entities as a JSON object. Fields the
/// converter does not descend into are left out.
pub fn export(entity: &dyn Entity, converter: &dyn Converter) -> Map<String, Value> {
    export_at(entity, converter, BindContext { path: "", parent: None })
}

fn export_at(entity: &dyn Entity, converter: &dyn Converter, context: BindContext<'_>) -> Map<String, Value> {
    let shape = entity.shape();
    let raw: Map<String, Value> = shape
        .fields()
        .iter()
        .map(|field| (field.clone(), entity.get(field)))
        .collect();

    let mut out = Map::new();
    for field in shape.fields() {
        if !converter.descend(field, &context) {
            continue;
        }
        let binding = Binding {
            field,
            present: true,
            source: &raw,
            candidate: raw.get(field.as_str()).unwrap_or(&NULL),
            context,
            previous: &NULL,
        };
        out.insert(field.clone(), converter.convert(&binding));
    }

    for decl in shape.nested() {
        if !converter.descend(&decl.field, &context) {
            continue;
        }
        let key = path_key(context.path, &decl.field);
        let value = match decl.nesting {
            Nesting::One => match entity.child(&decl.field) {
                Some(child) => {
                    let ctx = BindContext { path: &key, parent: Some(&raw) };
                    Value::Object(export_at(child, converter, ctx))
                }
                None => Value::Null,
            },
            Nesting::Many => Value::Array(
                entity
                    .children(&decl.field)
                    .into_iter()
                    .enumerate()
                    .map(|(index, child)| {
                        let child_key = element_key(&key, index);
                        let ctx = BindContext { path: &child_key, parent: Some(&raw) };
                        Value::Object(export_at(child, converter, ctx))
                    })
                    .collect(),
            ),
        };
        out.insert(decl.field.clone(), value);
    }
    out
}

fn populate_map(
    entity: &mut dyn Entity,
    source: &Map<String, Value>,
    converter: &dyn Converter,
    context: BindContext<'_>,
) -> anyhow::Result<()> {
    let shape = entity.shape();

    for field in shape.fields() {
        let previous = entity.get(field);
        let candidate = source.get(field.as_str());
        let binding = Binding {
            field,
            present: candidate.is_some(),
            source,
            candidate: candidate.unwrap_or(&NULL),
            context,
            previous: &previous,
        };
        let value = converter.convert(&binding);
        if value != previous {
            entity.set(field, value)?;
        }
    }

    for decl in shape.nested() {
        if !converter.descend(&decl.field, &context) {
            continue;
        }
        let Some(nested) = source.get(decl.field.as_str()) else {
            continue;
        };
        let key = path_key(context.path, &decl.field);
        let cannot_hold = || anyhow!("entity '{}' cannot hold nested '{}'", shape.name(), decl.field);

        match (decl.nesting, nested) {
            (_, Value::Null) => {}
            (Nesting::One, Value::Object(map)) => {
                let child = entity.reset_child(&decl.field).ok_or_else(cannot_hold)?;
                let ctx = BindContext { path: &key, parent: Some(source) };
                populate_map(child, map, converter, ctx)?;
            }
            (Nesting::Many, Value::Array(items)) => {
                entity.clear_children(&decl.field);
                for (index, item) in items.iter().enumerate() {
                    let Value::Object(map) = item else {
                        bail!("'{}' must hold objects, element {} is {}", key, index, kind(item));
                    };
                    let child = entity.push_child(&decl.field).ok_or_else(cannot_hold)?;
                    let child_key = element_key(&key, index);
                    let ctx = BindContext { path: &child_key, parent: Some(source) };
                    populate_map(child, map, converter, ctx)?;
                }
            }
            (Nesting::One, other) => bail!("'{}' expects an object, got {}", key, kind(other)),
            (Nesting::Many, other) => bail!("'{}' expects a list, got {}", key, kind(other)),
        }
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::registry::CheckRegistry;
    use crate::shape::EntityShape;
    use serde_json::json;
    use std::sync::Arc;

    fn user_shape() -> Arc<EntityShape> {
        let registry = CheckRegistry::new();
        let tag = Arc::new(EntityShape::builder("tag").field("name").build(&registry).unwrap());
        Arc::new(
            EntityShape::builder("user")
                .fields(["name", "email", "role"])
                .many("tags", tag)
                .build(&registry)
                .unwrap(),
        )
    }

    #[test]
    fn test_absent_fields_keep_previous_value() {
        let mut user = Record::new(user_shape());
        user.set("role", json!("admin")).unwrap();
        populate(&mut user, &json!({"name": "Ann"}), &DefaultConverter).unwrap();
        assert_eq!(user.get("name"), json!("Ann"));
        assert_eq!(user.get("role"), json!("admin"));
    }

    #[test]
    fn test_present_null_overwrites() {
        let mut user = Record::new(user_shape());
        user.set("role", json!("admin")).unwrap();
        populate(&mut user, &json!({"role": null}), &DefaultConverter).unwrap();
        assert_eq!(user.get("role"), Value::Null);
    }

    #[test]
    fn test_non_object_source_is_rejected() {
        let mut user = Record::new(user_shape());
        assert!(populate(&mut user, &json!([1, 2]), &DefaultConverter).is_err());
        assert!(populate(&mut user, &json!({"tags": "x"}), &DefaultConverter).is_err());
    }

    #[test]
    fn test_list_is_rebuilt_on_populate() {
        let mut user = Record::new(user_shape());
        populate(&mut user, &json!({"tags": [{"name": "a"}, {"name": "b"}]}), &DefaultConverter).unwrap();
        populate(&mut user, &json!({"tags": [{"name": "c"}]}), &DefaultConverter).unwrap();
        let tags = user.children("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].get("name"), json!("c"));
    }

    #[test]
    fn test_inject_writes_only_destination_fields() {
        let registry = CheckRegistry::new();
        let public = Arc::new(EntityShape::builder("public_user").fields(["name", "nickname"]).build(&registry).unwrap());
        let user = Record::from_json(user_shape(), &json!({"name": "Ann", "email": "a@b.c"})).unwrap();

        let view = inject(&user, Record::new(Arc::clone(&public)), &DefaultConverter).unwrap();
        assert_eq!(view.to_json(), json!({"name": "Ann", "nickname": null}));
    }

    #[test]
    fn test_describe_builds_destination() {
        let user = Record::from_json(user_shape(), &json!({"name": "Ann"})).unwrap();
        let copy = describe(&user, || Record::new(user_shape()), &DefaultConverter).unwrap();
        assert_eq!(copy.to_json(), user.to_json());
    }

    #[test]
    fn test_context_points_at_parent_source() {
        struct ParentName;
        impl Converter for ParentName {
            fn convert(&self, binding: &Binding<'_>) -> Value {
                match binding.context.parent {
                    Some(parent) if binding.field == "name" => {
                        json!(format!("{}:{}", parent["name"].as_str().unwrap_or(""), binding.candidate.as_str().unwrap_or("")))
                    }
                    _ => DefaultConverter.convert(binding),
                }
            }
        }

        let mut user = Record::new(user_shape());
        populate(&mut user, &json!({"name": "ann", "tags": [{"name": "x"}]}), &ParentName).unwrap();
        assert_eq!(user.children("tags")[0].get("name"), json!("ann:x"));
        assert_eq!(user.get("name"), json!("ann"));
    }
}
