// LogTriage - platform/config.rs
//
// Platform config directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogTriage configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logtriage/ or %APPDATA%\LogTriage\config\)
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

    /// Default location of `config.toml`.
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
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Name prefix of the captured stderr files.
    pub file_prefix: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Exclusion list file name.
    pub exclusions_file: Option<String>,
    /// Error notes file name.
    pub errors_file: Option<String>,
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
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub file_prefix: String,
    pub exclusions_file: String,
    pub errors_file: String,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            file_prefix: constants::DEFAULT_FILE_PREFIX.to_string(),
            exclusions_file: constants::DEFAULT_EXCLUSIONS_FILE.to_string(),
            errors_file: constants::DEFAULT_ERRORS_FILE.to_string(),
            log_level: None,
        }
    }
}

/// Load the config from the platform default location.
///
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning: an implicit config must
/// never stop a triage run.
pub fn load_default_config(paths: &PlatformPaths) -> (AppConfig, Vec<String>) {
    let config_path = paths.config_file();
    if !config_path.exists() {
        return (AppConfig::default(), Vec::new());
    }
    match load_config_file(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => (
            AppConfig::default(),
            vec![format!("{e}. Using defaults.")],
        ),
    }
}

/// Load and validate an explicit config file.
///
/// I/O and parse failures are errors; out-of-range values are warnings.
pub fn load_config_file(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let size = std::fs::metadata(config_path)
        .map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?
        .len();
    if size > constants::MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: config_path.to_path_buf(),
            size,
            max_size: constants::MAX_CONFIG_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Input: file_prefix --
    if let Some(prefix) = raw.input.file_prefix {
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            warnings.push(format!(
                "[input] file_prefix = \"{prefix}\" must be a non-empty file name prefix. \
                 Using default (\"{}\").",
                constants::DEFAULT_FILE_PREFIX
            ));
        } else {
            config.file_prefix = prefix;
        }
    }

    // -- Output: file names --
    if let Some(name) = raw.output.exclusions_file {
        match check_output_name(&name) {
            Ok(()) => config.exclusions_file = name,
            Err(reason) => warnings.push(format!(
                "[output] exclusions_file = \"{name}\" {reason}. Using default (\"{}\").",
                constants::DEFAULT_EXCLUSIONS_FILE
            )),
        }
    }
    if let Some(name) = raw.output.errors_file {
        match check_output_name(&name) {
            Ok(()) => config.errors_file = name,
            Err(reason) => warnings.push(format!(
                "[output] errors_file = \"{name}\" {reason}. Using default (\"{}\").",
                constants::DEFAULT_ERRORS_FILE
            )),
        }
    }
    if config.exclusions_file == config.errors_file {
        warnings.push(format!(
            "[output] exclusions_file and errors_file are both \"{}\". Using defaults.",
            config.errors_file
        ));
        config.exclusions_file = constants::DEFAULT_EXCLUSIONS_FILE.to_string();
        config.errors_file = constants::DEFAULT_ERRORS_FILE.to_string();
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

fn check_output_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        Err("is empty")
    } else if name.contains(['/', '\\']) || name == "." || name == ".." {
        Err("must be a plain file name")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).unwrap())
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let (config, warnings) = parse("");
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [input]
            file_prefix = "err_"
            [output]
            exclusions_file = "drop.json"
            errors_file = "notes.json"
            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.file_prefix, "err_");
        assert_eq!(config.exclusions_file, "drop.json");
        assert_eq!(config.errors_file, "notes.json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            r#"
            [output]
            exclusions_file = "../x.json"
            [logging]
            level = "loud"
            [unknown]
            key = 1
            "#,
        );
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert_eq!(config.exclusions_file, constants::DEFAULT_EXCLUSIONS_FILE);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_colliding_output_names_fall_back() {
        let (config, warnings) = parse(
            r#"
            [output]
            exclusions_file = "out.json"
            errors_file = "out.json"
            "#,
        );
        assert_eq!(warnings.len(), 1);
        assert_ne!(config.exclusions_file, config.errors_file);
    }

    #[test]
    fn test_explicit_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output\n").unwrap();
        assert!(matches!(
            load_config_file(&path),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config_file(&dir.path().join("nope.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
