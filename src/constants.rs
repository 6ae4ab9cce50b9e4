//! Application constants for the CSV to JSON converter
//!
//! This module contains the fixed record schema, validation limits,
//! artifact naming and default runtime settings.

// =============================================================================
// Record Schema
// =============================================================================

/// Number of positional fields in every data row
pub const FIELD_COUNT: usize = 5;

/// Field separator (no quoting or escaping is supported)
pub const FIELD_SEPARATOR: char = ',';

/// Positional field indices
pub mod fields {
    pub const INTERNAL_ID: usize = 0;
    pub const FIRST_NAME: usize = 1;
    pub const MIDDLE_NAME: usize = 2;
    pub const LAST_NAME: usize = 3;
    pub const PHONE_NUM: usize = 4;
}

/// Row number of the header line; the first data row is `HEADER_ROW + 1`
pub const HEADER_ROW: usize = 1;

// =============================================================================
// Validation Limits
// =============================================================================

/// Maximum number of characters kept for any name field
pub const MAX_NAME_LENGTH: usize = 15;

/// Required digit count for the internal id once hyphens are stripped
pub const INTERNAL_ID_DIGITS: usize = 8;

/// Anchored phone number pattern: `XXX-XXX-XXXX`
pub const PHONE_PATTERN: &str = r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$";

// =============================================================================
// Artifacts
// =============================================================================

/// Separator placed between issue codes of the same row
pub const ISSUE_SEPARATOR: &str = "-&-";

/// Extension of the JSON conversion artifact
pub const JSON_EXTENSION: &str = "json";

/// Extension of the error report artifact
pub const ERROR_EXTENSION: &str = "csv";

// =============================================================================
// Runtime Defaults
// =============================================================================

/// Files picked up by the watcher
pub const DEFAULT_FILE_PATTERN: &str = "*.csv";

/// Interval between directory scans
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Attempts made to reach a source file that may still be mid-write
pub const DEFAULT_SETTLE_ATTEMPTS: u32 = 5;

/// Delay between settle attempts
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Interactive console prompt
pub const CONSOLE_PROMPT: &str = "console> ";

/// Console command that arms the watcher
pub const COMMAND_CSVTOJSON: &str = "csvtojson";

/// Console command that quits the application
pub const COMMAND_EXIT: &str = "exit";

/// First line printed by the console
pub const WELCOME_MESSAGE: &str = "Welcome to the CSV to JSON Experience!";

/// Usage hint printed below the welcome line
pub const USAGE_HINT: &str = "Listen for csv files to convert to json by running this command: \
                              csvtojson /path/to/listen/ /path/to/jsonoutput/ /path/to/erroroutput/";
