// rulegate/src/ui/theme.rs
//! Colour theme for terminal output.
//!
//! Each logical output element maps to one of the 16 named ANSI colours.
//! A theme file is a YAML map from element name to `{ fg: <colour> }`;
//! elements it leaves out keep their default colour.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};

pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// Path keys in an error tree, e.g. `items[0][qty]`.
    FieldKey,
    /// A banned-word fragment found in the input.
    Match,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 7] = [
        ThemeEntry::Header,
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::FieldKey,
        ThemeEntry::Match,
    ];

    fn default_color(self) -> &'static str {
        match self {
            ThemeEntry::Header => "brightwhite",
            ThemeEntry::Success => "green",
            ThemeEntry::Info => "cyan",
            ThemeEntry::Warn => "yellow",
            ThemeEntry::Error => "red",
            ThemeEntry::FieldKey => "brightblue",
            ThemeEntry::Match => "brightred",
        }
    }
}

/// A named ANSI colour such as `"red"` or `"brightgreen"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(String);

#[derive(Debug, Clone)]
pub struct ParseThemeColorError(String);

impl fmt::Display for ParseThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid theme color '{}'; expected one of: black, red, green, yellow, blue, \
            magenta, cyan, white, or their bright variants (e.g. brightred).",
            self.0
        )
    }
}

impl std::error::Error for ParseThemeColorError {}

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let base = lower.strip_prefix("bright").unwrap_or(&lower);
        match base {
            "black" | "red" | "green" | "yellow" | "blue" | "magenta" | "cyan" | "white" => {
                Ok(ThemeColor(lower))
            }
            _ => Err(ParseThemeColorError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = ParseThemeColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> String {
        color.0
    }
}

impl ThemeColor {
    pub fn to_ansi_color(&self) -> AnsiColors {
        match self.0.as_str() {
            "black" => AnsiColors::Black,
            "red" => AnsiColors::Red,
            "green" => AnsiColors::Green,
            "yellow" => AnsiColors::Yellow,
            "blue" => AnsiColors::Blue,
            "magenta" => AnsiColors::Magenta,
            "cyan" => AnsiColors::Cyan,
            "white" => AnsiColors::White,
            "brightblack" => AnsiColors::BrightBlack,
            "brightred" => AnsiColors::BrightRed,
            "brightgreen" => AnsiColors::BrightGreen,
            "brightyellow" => AnsiColors::BrightYellow,
            "brightblue" => AnsiColors::BrightBlue,
            "brightmagenta" => AnsiColors::BrightMagenta,
            "brightcyan" => AnsiColors::BrightCyan,
            _ => AnsiColors::BrightWhite,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

/// Loads a theme from `path`, or the default theme when no path is given.
pub fn build_theme_map(path: Option<&Path>) -> Result<ThemeMap> {
    match path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

impl ThemeStyle {
    /// Reads a YAML theme and fills in defaults for missing entries.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let mut theme: ThemeMap = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        for (entry, style) in Self::default_theme_map() {
            theme.entry(entry).or_insert(style);
        }
        Ok(theme)
    }

    pub fn default_theme_map() -> ThemeMap {
        ThemeEntry::ALL
            .into_iter()
            .map(|entry| {
                let fg = ThemeColor(entry.default_color().to_string());
                (entry, ThemeStyle { fg: Some(fg) })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_named_colors() {
        assert!("red".parse::<ThemeColor>().is_ok());
        assert!("BrightGreen".parse::<ThemeColor>().is_ok());
        assert!("brightorange".parse::<ThemeColor>().is_err());
    }

    #[test]
    fn to_ansi_color_roundtrip() {
        let tc: ThemeColor = "blue".parse().unwrap();
        assert_eq!(tc.to_ansi_color(), AnsiColors::Blue);
        let tc: ThemeColor = "brightmagenta".parse().unwrap();
        assert_eq!(tc.to_ansi_color(), AnsiColors::BrightMagenta);
    }

    #[test]
    fn theme_file_overrides_and_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "error:\n  fg: magenta").unwrap();

        let theme = build_theme_map(Some(file.path())).unwrap();
        assert_eq!(theme[&ThemeEntry::Error].fg, Some(ThemeColor("magenta".into())));
        assert_eq!(theme[&ThemeEntry::Success].fg, Some(ThemeColor("green".into())));
        assert_eq!(theme.len(), ThemeEntry::ALL.len());
    }

    #[test]
    fn bad_color_in_theme_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "error:\n  fg: mauve").unwrap();
        assert!(build_theme_map(Some(file.path())).is_err());
    }
}
