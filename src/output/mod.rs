//! User-facing messages for the treesnap CLI.
//!
//! Everything goes to stderr so a manifest or completion script written to
//! stdout stays clean. Routine messages are dimmed and suppressed by `--quiet`;
//! warnings and errors always print.

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Only warnings and errors
    Quiet = 0,
    /// Progress, results and details
    Normal = 1,
    /// Scan summaries and other internals as well
    Verbose = 2,
}

impl Verbosity {
    /// Level selected by the `--quiet` and `--verbose` flags; quiet wins
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Whether a message of `tone` prints at this level
    #[must_use]
    pub const fn shows(self, tone: Tone) -> bool {
        match tone {
            Tone::Error | Tone::Warning => true,
            Tone::Success | Tone::Info | Tone::Action | Tone::Detail => {
                !matches!(self, Self::Quiet)
            }
            Tone::Verbose => matches!(self, Self::Verbose),
        }
    }
}

/// Kind of message, deciding its colour and when it prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Completed step
    Success,
    /// Failure
    Error,
    /// Recoverable problem
    Warning,
    /// Progress
    Info,
    /// Internals for `--verbose`
    Verbose,
    /// Git-style verb and subject
    Action,
    /// `key: value` summary line
    Detail,
}

/// Global verbosity setting
static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Print the line built by `line` if the current level shows `tone`
fn emit(tone: Tone, line: impl FnOnce() -> String) {
    if get_verbosity().shows(tone) {
        eprintln!("{}", line());
    }
}

/// Green result line
pub fn success(message: &str) {
    emit(Tone::Success, || message.green().to_string());
}

/// Bold red line, always shown
pub fn error(message: &str) {
    emit(Tone::Error, || message.red().bold().to_string());
}

/// Bold yellow line, always shown
pub fn warning(message: &str) {
    emit(Tone::Warning, || message.yellow().bold().to_string());
}

/// Dimmed progress line
pub fn info(message: &str) {
    emit(Tone::Info, || message.dimmed().to_string());
}

/// Dimmed line shown only with `--verbose`
pub fn verbose(message: &str) {
    emit(Tone::Verbose, || message.dimmed().to_string());
}

/// `<verb> <message>` with the verb dimmed, git style
pub fn action(verb: &str, message: &str) {
    emit(Tone::Action, || format!("{} {message}", verb.dimmed().bold()));
}

/// Indented `key: value` line
pub fn detail(key: &str, value: &str) {
    emit(Tone::Detail, || format_detail(key, value));
}

/// Render a detail line with the key column padded
fn format_detail(key: &str, value: &str) -> String {
    format!("  {:<12} {value}", format!("{key}:").dimmed())
}
