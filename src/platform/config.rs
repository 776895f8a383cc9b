// ImeiSift - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::ExportFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ImeiSift configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/imeisift/ or %APPDATA%\ImeiSift\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of the default config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[input]` section.
    pub input: InputSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Largest report file accepted, in bytes.
    pub max_file_size_bytes: Option<u64>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Width of the `=` separator line in the text export.
    pub separator_width: Option<usize>,
    /// Default export format: "text", "csv" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Largest report file accepted, in bytes.
    pub max_input_size: u64,

    /// Width of the `=` separator line in the text export.
    pub separator_width: usize,

    /// Default export format.
    pub export_format: ExportFormat,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,

    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_input_size: constants::DEFAULT_MAX_INPUT_SIZE,
            separator_width: constants::DEFAULT_SEPARATOR_WIDTH,
            export_format: ExportFormat::default(),
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal problems.
/// If the file does not exist, returns defaults with no problems (first-run).
/// If the file is unreadable or unparseable, returns defaults with that error;
/// out-of-range values fall back to their defaults individually.
///
/// Called before logging is initialised, so problems are only returned,
/// never logged here.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    let mut warnings = Vec::new();

    if !config_path.exists() {
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            warnings.push(ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            });
            return (AppConfig::default(), warnings);
        }
    };

    match toml::from_str::<RawConfig>(&content) {
        Ok(raw) => {
            let config = validate(raw, &mut warnings);
            (config, warnings)
        }
        Err(source) => {
            warnings.push(ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            });
            (AppConfig::default(), warnings)
        }
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig, warnings: &mut Vec<ConfigError>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Input: max_file_size_bytes --
    if let Some(size) = raw.input.max_file_size_bytes {
        if (constants::MIN_MAX_INPUT_SIZE..=constants::ABSOLUTE_MAX_INPUT_SIZE).contains(&size) {
            config.max_input_size = size;
        } else {
            warnings.push(out_of_range(
                "input.max_file_size_bytes",
                size,
                format!(
                    "{}-{} (default {})",
                    constants::MIN_MAX_INPUT_SIZE,
                    constants::ABSOLUTE_MAX_INPUT_SIZE,
                    constants::DEFAULT_MAX_INPUT_SIZE
                ),
            ));
        }
    }

    // -- Export: separator_width --
    if let Some(width) = raw.export.separator_width {
        if (constants::MIN_SEPARATOR_WIDTH..=constants::MAX_SEPARATOR_WIDTH).contains(&width) {
            config.separator_width = width;
        } else {
            warnings.push(out_of_range(
                "export.separator_width",
                width,
                format!(
                    "{}-{} (default {})",
                    constants::MIN_SEPARATOR_WIDTH,
                    constants::MAX_SEPARATOR_WIDTH,
                    constants::DEFAULT_SEPARATOR_WIDTH
                ),
            ));
        }
    }

    // -- Export: format --
    if let Some(ref format) = raw.export.format {
        match ExportFormat::parse(format) {
            Some(parsed) => config.export_format = parsed,
            None => warnings.push(out_of_range(
                "export.format",
                format,
                "\"text\", \"csv\" or \"json\" (default text)".to_string(),
            )),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(out_of_range(
                "logging.level",
                level,
                "error, warn, info, debug or trace (default info)".to_string(),
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}
