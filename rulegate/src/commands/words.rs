// rulegate/src/commands/words.rs
//! `rulegate words`: screen text for banned words.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use rulegate_fuzzy::FuzzyMatcher;
use serde_json::json;

use crate::cli::WordsCommand;
use crate::commands::{load_policy, read_input};
use crate::ui::output;
use crate::ui::theme::ThemeMap;

/// Reads a word list: one word per line, skipping blank lines and `#`
/// comments.
pub fn read_words_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read words file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn run_words(cmd: &WordsCommand, theme: &ThemeMap) -> Result<ExitCode> {
    let mut words = cmd.words.clone();
    if let Some(path) = &cmd.words_file {
        words.extend(read_words_file(path)?);
    }
    if words.is_empty() {
        bail!("No banned words given; pass --word or --words-file");
    }

    let policy = load_policy(cmd.policy.policy.as_deref())?;
    let matcher = FuzzyMatcher::new(policy).context("Invalid match policy")?;

    let raw = read_input(cmd.input_file.as_deref())?;
    let text = strip_ansi_escapes::strip_str(&raw);
    debug!(
        "Screening {} chars of input against {} banned word(s).",
        text.chars().count(),
        words.len()
    );

    let hit = matcher
        .find_any(&text, &words)
        .context("Failed to compile banned words")?;
    info!("Banned word search finished; match found: {}.", hit.is_some());

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.json {
        let body = match &hit {
            Some(hit) => json!({"matched": true, "word": hit.word, "fragment": hit.fragment}),
            None => json!({"matched": false}),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        let supports_color = stdout.is_terminal();
        let found = hit.as_ref().map(|h| (h.word.as_str(), h.fragment.as_str()));
        output::print_word_match(&mut writer, found, theme, supports_color)?;
    }

    if hit.is_some() && cmd.fail_on_match {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_read_words_file_skips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# banned\nspam\n\n  scam  \n").unwrap();
        assert_eq!(read_words_file(file.path()).unwrap(), ["spam", "scam"]);
    }
}
