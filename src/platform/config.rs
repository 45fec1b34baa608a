// LogAtlas - platform/config.rs
//
// Platform-specific data directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogAtlas data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logatlas/ or %APPDATA%\LogAtlas\)
    pub config_dir: PathBuf,

    /// Data directory holding the default gazette table.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Location of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    /// Default location of the country gazette table.
    pub fn default_gazette(&self) -> PathBuf {
        self.data_dir.join(constants::DEFAULT_GAZETTE_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[parsing]` section.
    pub parsing: ParsingSection,
    /// `[gazette]` section.
    pub gazette: GazetteSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Cap on decode errors kept per batch.
    pub max_errors_tracked: Option<usize>,
}

/// `[gazette]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct GazetteSection {
    /// Path to the country lookup table.
    pub table_path: Option<String>,
    /// Whether the table's first row is a header.
    pub has_headers: Option<bool>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// "csv" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Cap on decode errors kept per batch.
    pub max_parse_errors: usize,
    /// Explicit gazette table path; `None` means the platform default.
    pub gazette_path: Option<PathBuf>,
    pub gazette_has_headers: bool,
    /// Lowercase export format name ("csv" or "json").
    pub export_format: String,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_parse_errors: constants::MAX_PARSE_ERRORS_PER_BATCH,
            gazette_path: None,
            gazette_has_headers: false,
            export_format: "csv".to_string(),
            log_level: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, validation_warnings) = validate(raw);
    warnings.extend(validation_warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all warnings.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Parsing: max_errors_tracked --
    if let Some(max) = raw.parsing.max_errors_tracked {
        let range = constants::MIN_PARSE_ERRORS_PER_BATCH
            ..=constants::ABSOLUTE_MAX_PARSE_ERRORS_PER_BATCH;
        if range.contains(&max) {
            config.max_parse_errors = max;
        } else {
            warnings.push(out_of_range(
                "[parsing] max_errors_tracked",
                max,
                format!(
                    "{}-{} (using default {})",
                    range.start(),
                    range.end(),
                    constants::MAX_PARSE_ERRORS_PER_BATCH
                ),
            ));
        }
    }

    // -- Gazette --
    if let Some(path) = raw.gazette.table_path.filter(|p| !p.trim().is_empty()) {
        config.gazette_path = Some(PathBuf::from(path));
    }
    if let Some(has_headers) = raw.gazette.has_headers {
        config.gazette_has_headers = has_headers;
    }

    // -- Export: format --
    if let Some(format) = raw.export.format {
        let lowered = format.to_lowercase();
        if ["csv", "json"].contains(&lowered.as_str()) {
            config.export_format = lowered;
        } else {
            warnings.push(out_of_range(
                "[export] format",
                format,
                "\"csv\" or \"json\" (using default csv)".to_string(),
            ));
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(out_of_range(
                "[logging] level",
                level,
                "error, warn, info, debug, trace (using default info)".to_string(),
            ));
        }
    }

    (config, warnings)
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config() {
        let (_dir, path) = write_config(
            r#"
[parsing]
max_errors_tracked = 50

[gazette]
table_path = "/srv/geo/country_name_lookup.tsv"
has_headers = true

[export]
format = "JSON"

[logging]
level = "debug"
"#,
        );
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.max_parse_errors, 50);
        assert_eq!(
            config.gazette_path,
            Some(PathBuf::from("/srv/geo/country_name_lookup.tsv"))
        );
        assert!(config.gazette_has_headers);
        assert_eq!(config.export_format, "json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (_dir, path) = write_config(
            r#"
[parsing]
max_errors_tracked = 0

[export]
format = "xml"

[logging]
level = "loud"
"#,
        );
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings[0].contains("max_errors_tracked"));
        assert!(warnings[1].contains("xml"));
        assert!(warnings[2].contains("loud"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unparseable_config_warns() {
        let (_dir, path) = write_config("[parsing\nmax_errors_tracked = ");
        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_dir, path) = write_config("[future]\nenabled = true\n");
        let (_, warnings) = load_config(&path);
        assert!(warnings.is_empty());
    }
}
