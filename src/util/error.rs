// LogTriage - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every classification failure carries the file and line that caused it so
// the operator can triage the new warning shape directly.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogTriage operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogTriageError {
    /// Log file discovery failed.
    Discovery(DiscoveryError),

    /// A warning line could not be classified.
    Classify(ClassifyError),

    /// Writing an output file failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogTriageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Classify(e) => write!(f, "Classification error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
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

impl std::error::Error for LogTriageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Classify(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to locating the captured stderr files.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The log directory does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The log path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the log directory.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The configured file pattern is not a valid glob.
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// A file carries the stderr prefix but no integer id before its extension.
    InvalidFileName { path: PathBuf },

    /// Walkdir traversal error.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Log directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Log path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid log file pattern '{pattern}': {source}")
            }
            Self::InvalidFileName { path } => write!(
                f,
                "Cannot read a numeric id from log file name '{}'",
                path.display()
            ),
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogTriageError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Message errors (no file context)
// ---------------------------------------------------------------------------

/// Why a single warning message body was rejected.
///
/// Produced by `core::classify`, which only sees the message text. The app
/// layer attaches file and line context by converting into `ClassifyError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// No known template matched the message.
    Unrecognized,

    /// A template matched but the fields could not be extracted.
    Malformed { reason: String },

    /// A continuation message arrived before any record in the same file.
    ContinuationWithoutSubject,
}

impl MessageError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => f.write_str("unrecognized warning"),
            Self::Malformed { reason } => write!(f, "malformed warning: {reason}"),
            Self::ContinuationWithoutSubject => {
                f.write_str("continuation warning with no preceding subject")
            }
        }
    }
}

impl std::error::Error for MessageError {}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

/// Errors that abort the run because a warning line needs human triage.
#[derive(Debug)]
pub enum ClassifyError {
    /// The line matched none of the known warning templates.
    UnrecognizedWarning {
        file: PathBuf,
        line_number: u64,
        line: String,
    },

    /// The line matched a template but its fields were not as expected.
    MalformedWarning {
        file: PathBuf,
        line_number: u64,
        line: String,
        reason: String,
    },

    /// "Subject hemi has empty label" seen before any record in the file.
    ContinuationWithoutSubject {
        file: PathBuf,
        line_number: u64,
        line: String,
    },
}

impl ClassifyError {
    /// Attach file and line context to a message-level rejection.
    pub fn from_message(
        err: MessageError,
        file: PathBuf,
        line_number: u64,
        line: String,
    ) -> Self {
        match err {
            MessageError::Unrecognized => Self::UnrecognizedWarning {
                file,
                line_number,
                line,
            },
            MessageError::Malformed { reason } => Self::MalformedWarning {
                file,
                line_number,
                line,
                reason,
            },
            MessageError::ContinuationWithoutSubject => Self::ContinuationWithoutSubject {
                file,
                line_number,
                line,
            },
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedWarning {
                file,
                line_number,
                line,
            } => write!(
                f,
                "Unrecognized warning in '{}' line {line_number}: {line}",
                file.display()
            ),
            Self::MalformedWarning {
                file,
                line_number,
                line,
                reason,
            } => write!(
                f,
                "Cannot understand warning in '{}' line {line_number} ({reason}): {line}",
                file.display()
            ),
            Self::ContinuationWithoutSubject {
                file,
                line_number,
                line,
            } => write!(
                f,
                "Empty-label warning before any subject in '{}' line {line_number}: {line}",
                file.display()
            ),
        }
    }
}

impl std::error::Error for ClassifyError {}

impl From<ClassifyError> for LogTriageError {
    fn from(e: ClassifyError) -> Self {
        Self::Classify(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing the output files.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogTriageError {
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

    /// Config file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
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
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Config '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
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

impl From<ConfigError> for LogTriageError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogTriage results.
pub type Result<T> = std::result::Result<T, LogTriageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_from_message_keeps_context() {
        let err = ClassifyError::from_message(
            MessageError::malformed("subject id 'abc' is not an integer"),
            PathBuf::from("stderr_3.txt"),
            12,
            "x: UserWarning: Bad ordering".to_string(),
        );
        let text = err.to_string();
        assert!(text.contains("stderr_3.txt"), "{text}");
        assert!(text.contains("line 12"), "{text}");
        assert!(text.contains("abc"), "{text}");
    }

    #[test]
    fn test_top_level_error_exposes_source() {
        let err: LogTriageError = DiscoveryError::PermissionDenied {
            path: PathBuf::from("/logs"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Discovery error:"));
    }
}
