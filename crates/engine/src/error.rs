//! Error types for the roster engine.

use std::fmt;

/// Errors produced by a reconciliation run.
///
/// Malformed field values (dates, statuses, contact details) are never
/// errors; they degrade to sentinels so one bad cell cannot sink a run.
/// Only structural problems reach this enum.
#[derive(Debug)]
pub enum RosterError {
    /// TOML config failed to parse.
    ConfigParse(String),
    /// Config parsed but is semantically invalid.
    ConfigValidation(String),
    /// A configured source has no input data, or input carries an
    /// unconfigured tag.
    UnknownSource(String),
    /// The same source tag appears more than once in the input.
    DuplicateSource(String),
    /// A column named in the config is missing from the source CSV.
    MissingColumn { source: String, column: String },
    /// A CSV row is structurally broken (wrong field count, bad UTF-8).
    InvalidRecord {
        source: String,
        line: usize,
        message: String,
    },
    /// Underlying IO failure.
    Io(String),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            RosterError::ConfigValidation(msg) => write!(f, "invalid config: {msg}"),
            RosterError::UnknownSource(msg) => write!(f, "unknown source: {msg}"),
            RosterError::DuplicateSource(tag) => {
                write!(f, "duplicate source tag in input: '{tag}'")
            }
            RosterError::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing column '{column}'")
            }
            RosterError::InvalidRecord {
                source,
                line,
                message,
            } => {
                write!(f, "source '{source}': bad record at line {line}: {message}")
            }
            RosterError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<std::io::Error> for RosterError {
    fn from(e: std::io::Error) -> Self {
        RosterError::Io(e.to_string())
    }
}
