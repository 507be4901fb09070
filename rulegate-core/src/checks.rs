// rulegate-core/src/checks.rs
//! Built-in checks.
//!
//! Every check except `required`, `required_if` and `abort_if_blank` passes
//! on a blank value (null, empty string, empty list, empty object), so that
//! optional fields only need a `required` rule to become mandatory.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rulegate_fuzzy::FuzzyMatcher;
use serde_json::{json, Value};

use crate::check::{Check, CheckInput, Outcome};
use crate::errors::ConfigError;
use crate::registry::CheckRegistry;

type RunFn = fn(&CheckInput<'_>, &[Value]) -> anyhow::Result<Outcome>;
type ArgsFn = fn(&[Value]) -> Result<(), String>;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(?:\.[^\s@.]+)+$").expect("Failed to compile email regex")
});

/// Registers every built-in check. `matcher` backs `banned_words`.
pub(crate) fn register_builtins(registry: &mut CheckRegistry, matcher: Arc<FuzzyMatcher>) {
    let simple = [
        builtin("required", 0..=0, None, required),
        builtin("required_if", 2..=usize::MAX, Some(first_is_field_name), required_if),
        builtin("same_as", 1..=1, Some(first_is_field_name), same_as),
        builtin("min_length", 1..=1, Some(first_is_count), min_length),
        builtin("max_length", 1..=1, Some(first_is_count), max_length),
        builtin("min", 1..=1, Some(first_is_number), min),
        builtin("max", 1..=1, Some(first_is_number), max),
        builtin("integer", 0..=0, None, integer),
        builtin("number", 0..=0, None, number),
        builtin("one_of", 1..=usize::MAX, None, one_of),
        builtin("email", 0..=0, None, email),
        builtin("datetime", 0..=1, Some(all_strings), datetime),
        builtin("abort_if", 1..=usize::MAX, None, abort_if),
        builtin("abort_if_blank", 0..=0, None, abort_if_blank),
    ];
    for check in simple {
        registry.register(check.id, check);
    }
    registry.register("regex", PatternCheck::default());
    registry.register("banned_words", BannedWords { matcher });
}

/// True for null, `""`, `[]` and `{}`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Human-readable form of a value: strings unquoted, null empty.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality that treats `"5"` and `5` as the same scalar.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    let scalar = |v: &Value| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_));
    scalar(a) && scalar(b) && display(a) == display(b)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn length(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => display(other).chars().count(),
    }
}

struct Builtin {
    id: &'static str,
    arity: RangeInclusive<usize>,
    args: Option<ArgsFn>,
    run: RunFn,
}

fn builtin(id: &'static str, arity: RangeInclusive<usize>, args: Option<ArgsFn>, run: RunFn) -> Builtin {
    Builtin { id, arity, args, run }
}

fn arity_error(id: &str, arity: &RangeInclusive<usize>, got: usize) -> ConfigError {
    let expected = match (*arity.start(), *arity.end()) {
        (start, usize::MAX) => format!("at least {}", start),
        (start, end) if start == end => start.to_string(),
        (start, end) => format!("{} to {}", start, end),
    };
    ConfigError::InvalidArgs {
        check: id.to_string(),
        reason: format!("expected {} argument(s), got {}", expected, got),
    }
}

impl Check for Builtin {
    fn prepare(&self, args: &[Value]) -> Result<(), ConfigError> {
        if !self.arity.contains(&args.len()) {
            return Err(arity_error(self.id, &self.arity, args.len()));
        }
        if let Some(validate) = self.args {
            validate(args).map_err(|reason| ConfigError::InvalidArgs {
                check: self.id.to_string(),
                reason,
            })?;
        }
        Ok(())
    }

    fn run(&self, input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
        (self.run)(input, args)
    }
}

fn first_is_field_name(args: &[Value]) -> Result<(), String> {
    match args.first() {
        Some(Value::String(name)) if !name.is_empty() => Ok(()),
        other => Err(format!("expected a field name, got {:?}", other)),
    }
}

fn first_is_count(args: &[Value]) -> Result<(), String> {
    match args.first().and_then(Value::as_u64) {
        Some(_) => Ok(()),
        None => Err(format!("expected a non-negative integer, got {:?}", args.first())),
    }
}

fn first_is_number(args: &[Value]) -> Result<(), String> {
    match args.first().and_then(Value::as_f64) {
        Some(_) => Ok(()),
        None => Err(format!("expected a number, got {:?}", args.first())),
    }
}

fn all_strings(args: &[Value]) -> Result<(), String> {
    match args.iter().find(|v| !v.is_string()) {
        None => Ok(()),
        Some(other) => Err(format!("expected a string, got {}", other)),
    }
}

fn required(input: &CheckInput<'_>, _args: &[Value]) -> anyhow::Result<Outcome> {
    if is_blank(input.value) {
        return Ok(Outcome::error(input.message("required", json!({}))?));
    }
    Ok(Outcome::Pass)
}

/// `[other_field, expected...]`: required when `other_field` equals one of
/// the expected values.
fn required_if(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    let Some(other) = args.first().and_then(Value::as_str) else {
        return Ok(Outcome::Pass);
    };
    if !is_blank(input.value) {
        return Ok(Outcome::Pass);
    }
    let actual = input.sibling(other);
    if !args[1..].iter().any(|expected| loosely_equal(expected, &actual)) {
        return Ok(Outcome::Pass);
    }
    let params = json!({ "other": input.label_of(other), "expected": display(&actual) });
    Ok(Outcome::error(input.message("required_if", params)?))
}

fn same_as(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    let Some(other) = args.first().and_then(Value::as_str) else {
        return Ok(Outcome::Pass);
    };
    if is_blank(input.value) || loosely_equal(input.value, &input.sibling(other)) {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("same_as", json!({ "other": input.label_of(other) }))?))
}

fn min_length(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    let min = args.first().and_then(Value::as_u64).unwrap_or(0) as usize;
    if is_blank(input.value) || length(input.value) >= min {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("min_length", json!({ "min": min }))?))
}

fn max_length(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    let Some(max) = args.first().and_then(Value::as_u64) else {
        return Ok(Outcome::Pass);
    };
    if is_blank(input.value) || length(input.value) as u64 <= max {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("max_length", json!({ "max": max }))?))
}

// Non-numeric values pass min/max; pair them with `number` to reject those.
fn min(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    let (Some(bound), Some(actual)) = (args.first().and_then(Value::as_f64), as_f64(input.value)) else {
        return Ok(Outcome::Pass);
    };
    if actual >= bound {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("min", json!({ "min": args[0] }))?))
}

fn max(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    let (Some(bound), Some(actual)) = (args.first().and_then(Value::as_f64), as_f64(input.value)) else {
        return Ok(Outcome::Pass);
    };
    if actual <= bound {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("max", json!({ "max": args[0] }))?))
}

fn integer(input: &CheckInput<'_>, _args: &[Value]) -> anyhow::Result<Outcome> {
    let ok = match input.value {
        v if is_blank(v) => true,
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    };
    if ok {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("integer", json!({}))?))
}

fn number(input: &CheckInput<'_>, _args: &[Value]) -> anyhow::Result<Outcome> {
    if is_blank(input.value) || as_f64(input.value).is_some() {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("number", json!({}))?))
}

fn one_of(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    if is_blank(input.value) || args.iter().any(|choice| loosely_equal(choice, input.value)) {
        return Ok(Outcome::Pass);
    }
    let choices = args.iter().map(display).collect::<Vec<_>>().join(", ");
    Ok(Outcome::error(input.message("one_of", json!({ "choices": choices }))?))
}

fn email(input: &CheckInput<'_>, _args: &[Value]) -> anyhow::Result<Outcome> {
    if is_blank(input.value) || EMAIL_REGEX.is_match(&display(input.value)) {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("email", json!({}))?))
}

/// Checks whether `text` parses as a date, time or date-time.
///
/// # Arguments
///
/// * `text` - The candidate value.
/// * `format` - A `chrono` format string. Without one, RFC 3339 and the
///   common `YYYY-MM-DD[ HH:MM:SS]` forms are accepted.
///
/// # Returns
///
/// `true` if any accepted form parses.
fn parses_as_datetime(text: &str, format: Option<&str>) -> bool {
    match format {
        Some(fmt) => {
            DateTime::parse_from_str(text, fmt).is_ok()
                || NaiveDateTime::parse_from_str(text, fmt).is_ok()
                || NaiveDate::parse_from_str(text, fmt).is_ok()
                || NaiveTime::parse_from_str(text, fmt).is_ok()
        }
        None => {
            DateTime::parse_from_rfc3339(text).is_ok()
                || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok()
                || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
                || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        }
    }
}

fn datetime(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    if is_blank(input.value) {
        return Ok(Outcome::Pass);
    }
    let format = args.first().and_then(Value::as_str);
    if parses_as_datetime(display(input.value).trim(), format) {
        return Ok(Outcome::Pass);
    }
    Ok(Outcome::error(input.message("datetime", json!({}))?))
}

fn abort_if(input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
    if args.iter().any(|v| loosely_equal(v, input.value)) {
        debug!("abort_if matched on field '{}'.", input.field);
        return Ok(Outcome::Abort);
    }
    Ok(Outcome::Pass)
}

fn abort_if_blank(input: &CheckInput<'_>, _args: &[Value]) -> anyhow::Result<Outcome> {
    if is_blank(input.value) {
        return Ok(Outcome::Abort);
    }
    Ok(Outcome::Pass)
}

/// `regex` check. Patterns are compiled in `prepare` and kept per instance.
#[derive(Default)]
struct PatternCheck {
    cache: RwLock<HashMap<String, Arc<Regex>>>,
}

impl PatternCheck {
    fn compiled(&self, pattern: &str) -> Result<Arc<Regex>, ConfigError> {
        if let Some(regex) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(pattern)
        {
            return Ok(Arc::clone(regex));
        }

        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidArgs {
            check: "regex".to_string(),
            reason: format!("pattern '{}' does not compile: {}", pattern, e),
        })?;
        let regex = Arc::new(regex);
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pattern.to_string(), Arc::clone(&regex));
        Ok(regex)
    }

    fn pattern(args: &[Value]) -> Result<&str, ConfigError> {
        match args {
            [Value::String(pattern)] => Ok(pattern.as_str()),
            _ => Err(ConfigError::InvalidArgs {
                check: "regex".to_string(),
                reason: "expected exactly one pattern string".to_string(),
            }),
        }
    }
}

impl Check for PatternCheck {
    fn prepare(&self, args: &[Value]) -> Result<(), ConfigError> {
        self.compiled(Self::pattern(args)?).map(|_| ())
    }

    fn run(&self, input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
        if is_blank(input.value) {
            return Ok(Outcome::Pass);
        }
        let regex = self.compiled(Self::pattern(args)?)?;
        if regex.is_match(&display(input.value)) {
            return Ok(Outcome::Pass);
        }
        Ok(Outcome::error(input.message("regex", json!({ "pattern": regex.as_str() }))?))
    }
}

/// `banned_words` check. Arguments are words or lists of words.
struct BannedWords {
    matcher: Arc<FuzzyMatcher>,
}

impl BannedWords {
    fn words(args: &[Value]) -> Result<Vec<&str>, ConfigError> {
        let mut words = Vec::new();
        for arg in args {
            match arg {
                Value::String(word) => words.push(word.as_str()),
                Value::Array(items) => {
                    for item in items {
                        let Some(word) = item.as_str() else {
                            return Err(Self::invalid(item));
                        };
                        words.push(word);
                    }
                }
                other => return Err(Self::invalid(other)),
            }
        }
        Ok(words)
    }

    fn invalid(value: &Value) -> ConfigError {
        ConfigError::InvalidArgs {
            check: "banned_words".to_string(),
            reason: format!("expected a word or a list of words, got {}", value),
        }
    }
}

impl Check for BannedWords {
    fn prepare(&self, args: &[Value]) -> Result<(), ConfigError> {
        let words = Self::words(args)?;
        if words.is_empty() {
            return Err(ConfigError::InvalidArgs {
                check: "banned_words".to_string(),
                reason: "no words given".to_string(),
            });
        }
        for word in words {
            self.matcher.compiled(word)?;
        }
        Ok(())
    }

    fn run(&self, input: &CheckInput<'_>, args: &[Value]) -> anyhow::Result<Outcome> {
        if is_blank(input.value) {
            return Ok(Outcome::Pass);
        }
        let words = Self::words(args)?;
        let text = display(input.value);
        let found = self.matcher.match_any(&text, &words).map_err(ConfigError::from)?;
        match found {
            Some(fragment) => {
                let params = json!({ "word": fragment, "fragment": fragment });
                Ok(Outcome::error(input.message("banned_words", params)?))
            }
            None => Ok(Outcome::Pass),
        }
    }
}
