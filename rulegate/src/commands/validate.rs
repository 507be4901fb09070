// rulegate/src/commands/validate.rs
//! `rulegate validate`: check a JSON document against a schema entity.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use rulegate_core::{headless_validate_json, Schema, SchemaConfig, ValidationReport};
use serde_json::{json, Value};

use crate::cli::ValidateCommand;
use crate::commands::read_input;
use crate::ui::output;
use crate::ui::theme::ThemeMap;

/// Loads and builds a schema file.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let config = SchemaConfig::load_from_file(path)?;
    config
        .build()
        .with_context(|| format!("Invalid schema in {}", path.display()))
}

/// The JSON form printed by `--json`.
pub fn report_json(report: &ValidationReport) -> Value {
    json!({
        "valid": report.is_valid(),
        "aborted": report.aborted,
        "errors": report.errors,
    })
}

pub fn run_validate(cmd: &ValidateCommand, theme: &ThemeMap) -> Result<ExitCode> {
    let schema = load_schema(&cmd.schema)?;

    let raw = read_input(cmd.input_file.as_deref())?;
    let document: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;

    let report = headless_validate_json(&schema, &cmd.entity, &cmd.scope, &document)?;
    info!(
        "Validated '{}' under scope '{}': {} failing key(s){}.",
        cmd.entity,
        cmd.scope,
        report.errors.len(),
        if report.aborted { ", aborted" } else { "" }
    );

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report_json(&report))?)?;
    } else {
        let supports_color = stdout.is_terminal();
        output::print_error_tree(&mut writer, &cmd.entity, &report.errors, theme, supports_color)?;
        if report.aborted {
            let stderr_color = io::stderr().is_terminal();
            output::print_warn_message(
                &mut io::stderr(),
                "validation was aborted; later rules did not run",
                theme,
                stderr_color,
            )?;
        }
    }

    if report.is_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulegate_core::ErrorMap;

    #[test]
    fn test_report_json_shape() {
        let mut errors = ErrorMap::new();
        errors.push("name", "name is required");
        let report = ValidationReport {
            errors,
            aborted: false,
        };
        assert_eq!(
            report_json(&report),
            json!({"valid": false, "aborted": false, "errors": {"name": ["name is required"]}})
        );
    }
}
