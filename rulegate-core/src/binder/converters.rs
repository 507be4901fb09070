// rulegate-core/src/binder/converters.rs
//! Stock converters.
//!
//! `Exclude` matches bare field names at every nesting level. `Include`
//! filters the top level only: a nested entity named in its list is copied
//! whole.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{BindContext, Binding, Converter};

/// Takes the source value when present, otherwise keeps the previous one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl Converter for DefaultConverter {
    fn convert(&self, binding: &Binding<'_>) -> Value {
        if binding.present {
            binding.candidate.clone()
        } else {
            binding.previous.clone()
        }
    }
}

/// Leaves the named fields untouched.
#[derive(Debug, Clone)]
pub struct Exclude<C = DefaultConverter> {
    inner: C,
    fields: HashSet<String>,
}

impl Exclude {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Exclude::wrap(DefaultConverter, fields)
    }
}

impl<C: Converter> Exclude<C> {
    pub fn wrap<I, S>(inner: C, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl<C: Converter> Converter for Exclude<C> {
    fn convert(&self, binding: &Binding<'_>) -> Value {
        if self.fields.contains(binding.field) {
            binding.previous.clone()
        } else {
            self.inner.convert(binding)
        }
    }

    fn descend(&self, field: &str, context: &BindContext<'_>) -> bool {
        !self.fields.contains(field) && self.inner.descend(field, context)
    }
}

/// Copies only the named top-level fields. Everything inside an included
/// nested entity is copied.
#[derive(Debug, Clone)]
pub struct Include<C = DefaultConverter> {
    inner: C,
    fields: HashSet<String>,
}

impl Include {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Include::wrap(DefaultConverter, fields)
    }
}

impl<C: Converter> Include<C> {
    pub fn wrap<I, S>(inner: C, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl<C: Converter> Include<C> {
    fn admits(&self, field: &str, context: &BindContext<'_>) -> bool {
        !context.path.is_empty() || self.fields.contains(field)
    }
}

impl<C: Converter> Converter for Include<C> {
    fn convert(&self, binding: &Binding<'_>) -> Value {
        if self.admits(binding.field, &binding.context) {
            self.inner.convert(binding)
        } else {
            binding.previous.clone()
        }
    }

    fn descend(&self, field: &str, context: &BindContext<'_>) -> bool {
        self.admits(field, context) && self.inner.descend(field, context)
    }
}

type DeriveFn = Arc<dyn Fn(&Map<String, Value>) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
enum AliasRule {
    Rename(String),
    Derive(DeriveFn),
}

impl fmt::Debug for AliasRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasRule::Rename(from) => f.debug_tuple("Rename").field(from).finish(),
            AliasRule::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// Fills fields from differently named source keys, or derives them from
/// the whole source object.
#[derive(Debug, Clone)]
pub struct Alias<C = DefaultConverter> {
    inner: C,
    rules: HashMap<String, AliasRule>,
}

impl Default for Alias {
    fn default() -> Self {
        Self::new()
    }
}

impl Alias {
    pub fn new() -> Self {
        Alias::wrap(DefaultConverter)
    }
}

impl<C: Converter> Alias<C> {
    pub fn wrap(inner: C) -> Self {
        Self {
            inner,
            rules: HashMap::new(),
        }
    }

    /// Reads `field` from the source key `from`.
    pub fn rename(mut self, field: impl Into<String>, from: impl Into<String>) -> Self {
        self.rules.insert(field.into(), AliasRule::Rename(from.into()));
        self
    }

    /// Computes `field` from the source object. `None` keeps the previous
    /// value.
    pub fn derive<F>(mut self, field: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Option<Value> + Send + Sync + 'static,
    {
        self.rules.insert(field.into(), AliasRule::Derive(Arc::new(derive)));
        self
    }
}

impl<C: Converter> Converter for Alias<C> {
    fn convert(&self, binding: &Binding<'_>) -> Value {
        match self.rules.get(binding.field) {
            Some(AliasRule::Rename(from)) => {
                let candidate = binding.source.get(from.as_str());
                self.inner.convert(&Binding {
                    present: candidate.is_some(),
                    candidate: candidate.unwrap_or(&super::NULL),
                    ..*binding
                })
            }
            Some(AliasRule::Derive(derive)) => {
                derive(binding.source).unwrap_or_else(|| binding.previous.clone())
            }
            None => self.inner.convert(binding),
        }
    }

    fn descend(&self, field: &str, context: &BindContext<'_>) -> bool {
        self.inner.descend(field, context)
    }
}
