// LogTriage - util/constants.rs
//
// Single source of truth for all named constants, markers, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTriage";

/// Application identifier used for config directories.
pub const APP_ID: &str = "LogTriage";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input
// =============================================================================

/// Prefix of captured stderr files written by the pipeline's batch runner.
pub const DEFAULT_FILE_PREFIX: &str = "stderr_";

/// Marker separating the Python warning location from the message body.
pub const WARNING_MARKER: &str = ": UserWarning: ";

// =============================================================================
// Output
// =============================================================================

/// Exclusion list file name (array of `[structure, subject, hemi]`).
pub const DEFAULT_EXCLUSIONS_FILE: &str = "exclusions.json";

/// Detailed error notes file name.
pub const DEFAULT_ERRORS_FILE: &str = "errors.json";

/// Structure name used for group-average results. Never excluded.
pub const MEAN_STRUCTURE: &str = "mean";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in error messages and debug output.
pub const MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum size of `config.toml` in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB
