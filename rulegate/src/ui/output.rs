// rulegate/src/ui/output.rs
//! Writers for command results and status messages.
//!
//! Every function takes the target writer and a `supports_color` flag so the
//! caller decides, per stream, whether ANSI styling is emitted.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use rulegate_core::ErrorMap;

use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Writes `text` in the colour configured for `entry`.
pub fn write_styled<W: Write + ?Sized>(
    writer: &mut W,
    text: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let color = theme.get(&entry).and_then(|style| style.fg.as_ref());
    match color {
        Some(color) if supports_color => write!(writer, "{}", text.color(color.to_ansi_color())),
        _ => write!(writer, "{}", text),
    }
}

fn print_prefixed<W: Write + ?Sized>(
    writer: &mut W,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, prefix, entry, theme, supports_color)?;
    writeln!(writer, " {}", msg)
}

pub fn print_info_message<W: Write + ?Sized>(
    writer: &mut W,
    msg: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_prefixed(writer, "info:", msg, ThemeEntry::Info, theme, supports_color)
}

pub fn print_warn_message<W: Write + ?Sized>(
    writer: &mut W,
    msg: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_prefixed(writer, "warning:", msg, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write + ?Sized>(
    writer: &mut W,
    msg: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_prefixed(writer, "error:", msg, ThemeEntry::Error, theme, supports_color)
}

/// Prints an error tree, one path key per block with its messages indented
/// below it. An empty tree prints a single success line.
pub fn print_error_tree<W: Write + ?Sized>(
    writer: &mut W,
    entity: &str,
    errors: &ErrorMap,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if errors.is_empty() {
        write_styled(writer, "valid:", ThemeEntry::Success, theme, supports_color)?;
        return writeln!(writer, " {} passed every rule in scope", entity);
    }

    let total: usize = errors.iter().map(|(_, messages)| messages.len()).sum();
    let header = format!(
        "{} is invalid: {} error(s) in {} field(s)",
        entity,
        total,
        errors.len()
    );
    write_styled(writer, &header, ThemeEntry::Header, theme, supports_color)?;
    writeln!(writer)?;

    for (key, messages) in errors.iter() {
        write!(writer, "  ")?;
        write_styled(writer, key, ThemeEntry::FieldKey, theme, supports_color)?;
        writeln!(writer)?;
        for message in messages {
            write!(writer, "    - ")?;
            write_styled(writer, message, ThemeEntry::Error, theme, supports_color)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Prints the outcome of a banned-word search.
pub fn print_word_match<W: Write + ?Sized>(
    writer: &mut W,
    found: Option<(&str, &str)>,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    match found {
        Some((word, fragment)) => {
            write_styled(writer, "match:", ThemeEntry::Warn, theme, supports_color)?;
            write!(writer, " banned word '{}' found as \"", word)?;
            write_styled(writer, fragment, ThemeEntry::Match, theme, supports_color)?;
            writeln!(writer, "\"")
        }
        None => {
            write_styled(writer, "clean:", ThemeEntry::Success, theme, supports_color)?;
            writeln!(writer, " no banned words found")
        }
    }
}
