// rulegate-core/src/messages.rs
//! Message templates for the built-in checks.
//!
//! Templates use `tinytemplate` syntax (`{label} is required`) and are
//! rendered with a JSON context. Every template is parsed when it is added
//! to the catalog, so a broken override fails at load time.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::errors::ConfigError;

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("required", "{label} is required"),
    ("required_if", "{label} is required when {other} is {expected}"),
    ("same_as", "{label} must match {other}"),
    ("min_length", "{label} must be at least {min} characters"),
    ("max_length", "{label} must be at most {max} characters"),
    ("min", "{label} must be at least {min}"),
    ("max", "{label} must be at most {max}"),
    ("integer", "{label} must be an integer"),
    ("number", "{label} must be a number"),
    ("one_of", "{label} must be one of: {choices}"),
    ("regex", "{label} has an invalid format"),
    ("email", "{label} must be a valid email address"),
    ("datetime", "{label} must be a valid date or time"),
    ("banned_words", "{label} must not contain \"{word}\""),
];

/// Named message templates.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates = DEFAULT_TEMPLATES
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        Self { templates }
    }
}

impl MessageCatalog {
    /// The default catalog with `overrides` applied on top.
    pub fn with_overrides<I, K, V>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut catalog = Self::default();
        for (name, text) in overrides {
            catalog.set(name, text)?;
        }
        Ok(catalog)
    }

    /// Adds or replaces a template after checking that it parses.
    pub fn set(&mut self, name: impl Into<String>, text: impl Into<String>) -> Result<(), ConfigError> {
        let name = name.into();
        let text = text.into();
        {
            let mut tt = TinyTemplate::new();
            tt.add_template(&name, &text)
                .map_err(|e| ConfigError::InvalidTemplate {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
        }
        debug!("Message template '{}' set.", name);
        self.templates.insert(name, text);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn render(&self, name: &str, context: &Value) -> Result<String, ConfigError> {
        let text = self
            .templates
            .get(name)
            .ok_or_else(|| ConfigError::MissingTemplate(name.to_string()))?;

        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&format_unescaped);
        let invalid = |e: tinytemplate::error::Error| ConfigError::InvalidTemplate {
            name: name.to_string(),
            reason: e.to_string(),
        };
        tt.add_template(name, text).map_err(invalid)?;
        tt.render(name, context).map_err(invalid)
    }
}
