// LogAtlas - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogAtlas";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogAtlas";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log line decoding
// =============================================================================

/// Reason attached to a bad record when a line does not fit the access-log
/// grammar.
pub const BAD_RECORD_NO_MATCH: &str = "no match";

/// Raw tokens in the `size` column that mean "no body was sent".
pub const SIZE_BLANKISH: &[&str] = &["", "-"];

/// Raw tokens in the trailing remainder that mean "nothing left over".
pub const CRUFT_BLANKISH: &[&str] = &[""];

/// Maximum number of coercion errors tracked per batch before suppression.
/// Bad records themselves are always kept; only the error list is capped.
pub const MAX_PARSE_ERRORS_PER_BATCH: usize = 1_000;

/// Minimum user-configurable error cap.
pub const MIN_PARSE_ERRORS_PER_BATCH: usize = 1;

/// Hard upper bound on the error cap (prevents configuration mistakes).
pub const ABSOLUTE_MAX_PARSE_ERRORS_PER_BATCH: usize = 1_000_000;

// =============================================================================
// Gazette
// =============================================================================

/// Default country lookup table file name, resolved against the data
/// directory when no explicit path is configured.
pub const DEFAULT_GAZETTE_FILE_NAME: &str = "country_name_lookup.tsv";

/// Column delimiter of the gazette table.
pub const GAZETTE_DELIMITER: u8 = b'\t';

/// Separator used inside a place's `alternate_names` field.
pub const ALTERNATE_NAMES_SEPARATOR: char = '|';

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Export
// =============================================================================

/// Maximum number of records that can be exported in a single operation.
pub const MAX_EXPORT_ENTRIES: usize = 5_000_000;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
