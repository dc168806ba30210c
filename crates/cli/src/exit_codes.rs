//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them, so existing values never change meaning.
//!
//! # Exit Code Ranges
//!
//! | Code | Meaning                                                |
//! |------|--------------------------------------------------------|
//! | 0    | Success (including runs with zero matched drugs)       |
//! | 1    | General error (unspecified)                            |
//! | 2    | Usage error (bad arguments, unknown tab or sort key)   |
//! | 3    | Input load error (unreadable or malformed formulary)   |
//! | 4    | Config error (unreadable, unparsable or invalid TOML)  |
//! | 5    | Output write error (JSON, workbook or CSV export)      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or view options.
pub const EXIT_USAGE: u8 = 2;

/// A formulary file could not be read or parsed.
pub const EXIT_INPUT: u8 = 3;

/// The `--config` file could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 4;

/// An output artifact could not be written.
pub const EXIT_OUTPUT: u8 = 5;
