//! Process exit codes. doctag follows the Ruff convention so a CI step can
//! tell "tags are out of date" apart from a broken run.

/// Every file is already up to date, or `--fix` applied everything.
pub const SUCCESS: i32 = 0;

/// Check mode found tags that would be updated.
pub const CHANGES_FOUND: i32 = 1;

/// Bad configuration, file access failure, or an internal error.
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::{CHANGES_FOUND, SUCCESS, TOOL_ERROR};

    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    pub fn changes_found() -> ! {
        std::process::exit(CHANGES_FOUND);
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
