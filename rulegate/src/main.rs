// rulegate/src/main.rs
//! Rulegate entry point.
//!
//! Exit codes: 0 when the input is clean or valid, 1 when a banned word was
//! found (with `--fail-on-match`) or validation produced errors, 2 when the
//! command itself could not run.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use rulegate::cli::{Cli, Commands};
use rulegate::commands::{self, pattern, validate, words};
use rulegate::logger;
use rulegate::ui::theme::{build_theme_map, ThemeMap, ThemeStyle};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));
    debug!("Parsed CLI arguments: {:?}", cli);

    let theme = match build_theme_map(cli.theme.as_deref()).context("Theme error") {
        Ok(theme) => theme,
        Err(e) => {
            let fallback = ThemeStyle::default_theme_map();
            commands::error_msg(format!("{:#}", e), &fallback);
            return ExitCode::from(2);
        }
    };

    match run(&cli, &theme) {
        Ok(code) => code,
        Err(e) => {
            commands::error_msg(format!("{:#}", e), &theme);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli, theme: &ThemeMap) -> Result<ExitCode> {
    match &cli.command {
        Commands::Words(cmd) => words::run_words(cmd, theme),
        Commands::Pattern(cmd) => pattern::run_pattern(cmd, cli.quiet),
        Commands::Validate(cmd) => validate::run_validate(cmd, theme),
    }
}
