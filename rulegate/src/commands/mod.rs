// rulegate/src/commands/mod.rs
//! Command implementations and the input helpers they share.

pub mod pattern;
pub mod validate;
pub mod words;

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use rulegate_fuzzy::MatchPolicy;

use crate::ui::output;
use crate::ui::theme::ThemeMap;

/// Reads `path`, or all of stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()))
        }
        None => {
            info!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Loads a YAML match policy, or the default policy when no path is given.
/// Fields missing from the file keep their defaults.
pub fn load_policy(path: Option<&Path>) -> Result<MatchPolicy> {
    let Some(path) = path else {
        return Ok(MatchPolicy::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;
    let policy: MatchPolicy = serde_yml::from_str(&text)
        .with_context(|| format!("Failed to parse policy file {}", path.display()))?;
    policy
        .validate()
        .with_context(|| format!("Invalid match policy in {}", path.display()))?;
    debug!("Loaded match policy from {}: {:?}", path.display(), policy);
    Ok(policy)
}

/// Prints an error message to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output::print_error_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_policy_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blank_ratio_threshold: 0.25").unwrap();

        let policy = load_policy(Some(file.path())).unwrap();
        assert_eq!(policy.blank_ratio_threshold, 0.25);
        assert_eq!(policy.min_length_for_blank, MatchPolicy::default().min_length_for_blank);
    }

    #[test]
    fn test_load_policy_rejects_bad_ratio() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blank_ratio_threshold: 1.5").unwrap();
        let err = load_policy(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid match policy"));
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/no/such/input.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }
}
