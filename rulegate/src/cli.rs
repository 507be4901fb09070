// rulegate/src/cli.rs
//! This file defines the command-line interface (CLI) for the rulegate application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "rulegate",
    author = "Rulegate contributors",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate entities against declarative rules and screen text for banned words",
    long_about = "Rulegate checks JSON documents against entity schemas declared in YAML, reporting every failing field under a stable path key such as `items[0][qty]`. It also screens free text for banned words, tolerating separators, masking characters and look-alike letters.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG to DEBUG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `rulegate` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Searches text for banned words.
    #[command(about = "Searches an input file or stdin for banned words.")]
    Words(WordsCommand),

    /// Prints the pattern synthesized for a banned word.
    #[command(about = "Prints the regular expression synthesized for a banned word.")]
    Pattern(PatternCommand),

    /// Validates a JSON document against an entity schema.
    #[command(about = "Validates a JSON document against an entity declared in a schema file.")]
    Validate(ValidateCommand),
}

/// Options shared by commands that build a fuzzy matcher.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Path to a YAML match policy.
    #[arg(long = "policy", value_name = "FILE", env = "RULEGATE_POLICY", help = "Path to a YAML file overriding the default match policy.")]
    pub policy: Option<PathBuf>,
}

/// Arguments for the `words` command.
#[derive(Args, Debug)]
pub struct WordsCommand {
    /// Input file to scan. Reads stdin when omitted.
    #[arg(value_name = "INPUT_FILE", help = "Input file to scan. Reads from stdin if omitted.")]
    pub input_file: Option<PathBuf>,

    /// A banned word. May be repeated.
    #[arg(long = "word", short = 'w', value_name = "WORD", help = "A banned word. May be given several times.")]
    pub words: Vec<String>,

    /// File with one banned word per line.
    #[arg(long = "words-file", value_name = "FILE", help = "Read banned words from a file, one per line. Blank lines and lines starting with '#' are ignored.")]
    pub words_file: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Exit with a non-zero code when a banned word is found.
    #[arg(long = "fail-on-match", help = "Exit with a non-zero status code if a banned word is found.")]
    pub fail_on_match: bool,

    /// Print the result as JSON.
    #[arg(long, help = "Print the result as a JSON object.")]
    pub json: bool,
}

/// Arguments for the `pattern` command.
#[derive(Args, Debug)]
pub struct PatternCommand {
    /// The word to compile.
    #[arg(value_name = "WORD", help = "The banned word to compile.")]
    pub word: String,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Input JSON file. Reads stdin when omitted.
    #[arg(value_name = "INPUT_FILE", help = "JSON document to validate. Reads from stdin if omitted.")]
    pub input_file: Option<PathBuf>,

    /// Schema file declaring entities, rules and scopes.
    #[arg(long, short = 's', value_name = "FILE", env = "RULEGATE_SCHEMA", help = "Path to the YAML schema file.")]
    pub schema: PathBuf,

    /// Entity type the document is an instance of.
    #[arg(long, short = 'e', value_name = "NAME", help = "Name of the entity declared in the schema.")]
    pub entity: String,

    /// Scope expression, e.g. `create` or `update|publish`.
    #[arg(long, default_value = "create", value_name = "SCOPE", help = "Scope expression selecting which rules apply.")]
    pub scope: String,

    /// Print the error tree as JSON.
    #[arg(long, help = "Print the error tree as a JSON object.")]
    pub json: bool,
}
