// rulegate/src/logger.rs
//! Logger setup for the rulegate binary.
//!
//! The libraries only emit `log` records; this is the one place a backend is
//! installed. Output goes to stderr so it never mixes with command results.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs `env_logger`.
///
/// With `Some(level)` the level is forced, ignoring `RUST_LOG`. With `None`
/// the filter comes from `RUST_LOG`, defaulting to `warn`. Calling this more
/// than once is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).format_target(false);
    let _ = builder.try_init();
}

/// Picks the level implied by the global `--quiet` and `--debug` flags.
/// Quiet wins when both are set.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
