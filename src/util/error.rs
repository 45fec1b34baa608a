// LogAtlas - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors preserve the causal chain
// for diagnostic logging.
//
// A log line that does not fit the grammar is NOT an error: it decodes to
// `ParsedLine::Bad`. The types here cover the narrower failures that remain.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogAtlas operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogAtlasError {
    /// Country gazette loading failed.
    Gazette(GazetteError),

    /// Export operation failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogAtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gazette(e) => write!(f, "Gazette error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogAtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gazette(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Field coercion errors
// ---------------------------------------------------------------------------

/// Why a single raw field value could not be coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionFailure {
    /// A required field had no value (absent capture or blankish token).
    Missing,

    /// The value is not a valid integer.
    InvalidInteger,

    /// The value is not a valid floating point number.
    InvalidFloat,

    /// The value is not a recognisable timestamp, or names an impossible
    /// date/time/offset.
    InvalidTimestamp,

    /// A three-letter month abbreviation outside `Jan`..`Dec`.
    UnknownMonth(String),
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "value is missing"),
            Self::InvalidInteger => write!(f, "not a valid integer"),
            Self::InvalidFloat => write!(f, "not a valid number"),
            Self::InvalidTimestamp => write!(f, "not a valid timestamp"),
            Self::UnknownMonth(month) => write!(f, "unknown month abbreviation '{month}'"),
        }
    }
}

/// A specific field's value is wrong, as opposed to the shape of the whole
/// line being wrong (which produces a bad record instead).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCoercionError {
    /// Declared name of the field.
    pub field: &'static str,
    /// The raw captured text (empty when the capture was absent).
    pub raw_value: String,
    /// What went wrong.
    pub reason: CoercionFailure,
}

impl FieldCoercionError {
    pub fn new(field: &'static str, raw_value: Option<&str>, reason: CoercionFailure) -> Self {
        Self {
            field,
            raw_value: raw_value.unwrap_or_default().to_string(),
            reason,
        }
    }
}

impl fmt::Display for FieldCoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}' = '{}': {}",
            self.field, self.raw_value, self.reason
        )
    }
}

impl std::error::Error for FieldCoercionError {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Errors from constructing a typed record out of positional captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// One field failed its coercion.
    FieldCoercion(FieldCoercionError),

    /// The number of positional values does not match the declared fields.
    FieldCount { expected: usize, actual: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCoercion(e) => write!(f, "{e}"),
            Self::FieldCount { expected, actual } => write!(
                f,
                "expected {expected} positional values, got {actual}"
            ),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FieldCoercion(e) => Some(e),
            Self::FieldCount { .. } => None,
        }
    }
}

impl From<FieldCoercionError> for DecodeError {
    fn from(e: FieldCoercionError) -> Self {
        Self::FieldCoercion(e)
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Per-line failures recorded during batch parsing. These never abort a
/// batch; they are collected alongside the decoded records.
#[derive(Debug)]
pub enum ParseError {
    /// A line matched the grammar but one of its fields could not be decoded.
    Decode {
        line_number: u64,
        source: DecodeError,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode {
                line_number,
                source,
            } => write!(f, "line {line_number}: {source}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Gazette errors
// ---------------------------------------------------------------------------

/// Errors related to loading the country gazette table.
#[derive(Debug)]
pub enum GazetteError {
    /// I/O error opening or reading the table file.
    Io { path: PathBuf, source: io::Error },

    /// A row could not be read or deserialised.
    Csv {
        path: Option<PathBuf>,
        source: csv::Error,
    },
}

impl fmt::Display for GazetteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "I/O error reading gazette '{}': {source}", path.display())
            }
            Self::Csv {
                path: Some(path),
                source,
            } => write!(f, "Malformed gazette table '{}': {source}", path.display()),
            Self::Csv { path: None, source } => write!(f, "Malformed gazette table: {source}"),
        }
    }
}

impl std::error::Error for GazetteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
        }
    }
}

impl From<GazetteError> for LogAtlasError {
    fn from(e: GazetteError) -> Self {
        Self::Gazette(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum entry count.
    TooManyEntries { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyEntries { count, max } => write!(
                f,
                "Export of {count} records exceeds maximum of {max}. \
                 Split the input log into smaller files."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for LogAtlasError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for LogAtlas results.
pub type Result<T> = std::result::Result<T, LogAtlasError>;
