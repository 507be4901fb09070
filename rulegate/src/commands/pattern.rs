// rulegate/src/commands/pattern.rs
//! `rulegate pattern`: show what a banned word compiles to.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use rulegate_fuzzy::FuzzyMatcher;

use crate::cli::PatternCommand;
use crate::commands::load_policy;

/// Prints the synthesized pattern on stdout, followed by the unit count and
/// mask budget on stderr.
pub fn run_pattern(cmd: &PatternCommand, quiet: bool) -> Result<ExitCode> {
    let policy = load_policy(cmd.policy.policy.as_deref())?;
    let matcher = FuzzyMatcher::new(policy).context("Invalid match policy")?;
    let compiled = matcher
        .compiled(&cmd.word)
        .with_context(|| format!("Failed to compile banned word '{}'", cmd.word))?;

    writeln!(io::stdout().lock(), "{}", compiled.pattern())?;
    if !quiet {
        writeln!(
            io::stderr().lock(),
            "units: {}, mask budget: {}",
            compiled.unit_count(),
            compiled.mask_budget()
        )?;
    }
    Ok(ExitCode::SUCCESS)
}
