//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | roster           | Reconciliation-specific codes            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use rollcall_engine::RosterError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Roster (3-9)
// =============================================================================

/// Config rejected: TOML parse error or semantic validation failure.
pub const EXIT_ROSTER_INVALID_CONFIG: u8 = 3;

/// Runtime failure: unreadable files, malformed CSV, engine errors.
pub const EXIT_ROSTER_RUNTIME: u8 = 4;

/// Run completed but left findings: unmatched signal events or
/// headcount slots nobody could fill.
pub const EXIT_ROSTER_FINDINGS: u8 = 5;

/// Map an engine error to its exit code.
pub fn roster_exit_code(err: &RosterError) -> u8 {
    match err {
        RosterError::ConfigParse(_) | RosterError::ConfigValidation(_) => {
            EXIT_ROSTER_INVALID_CONFIG
        }
        RosterError::UnknownSource(_)
        | RosterError::DuplicateSource(_)
        | RosterError::MissingColumn { .. }
        | RosterError::InvalidRecord { .. }
        | RosterError::Io(_) => EXIT_ROSTER_RUNTIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_invalid_config() {
        let err = RosterError::ConfigValidation("no primary source".into());
        assert_eq!(roster_exit_code(&err), EXIT_ROSTER_INVALID_CONFIG);
        let err = RosterError::ConfigParse("expected a table".into());
        assert_eq!(roster_exit_code(&err), EXIT_ROSTER_INVALID_CONFIG);
    }

    #[test]
    fn data_errors_map_to_runtime() {
        let err = RosterError::MissingColumn {
            source: "luma".into(),
            column: "Email".into(),
        };
        assert_eq!(roster_exit_code(&err), EXIT_ROSTER_RUNTIME);
    }
}
