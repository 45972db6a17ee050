// LogTriage - core/discovery.rs
//
// Locate the captured stderr files of a pipeline run.
//
// The batch runner writes one `stderr_<id>.txt` per job directly into the log
// directory, so only the top level is scanned. This module reads file
// *metadata* only; contents are read by the app layer.
//
// Files whose name matches the pattern but carries no integer id are a hard
// error: a stray file in the log directory needs a human to look at it.

use crate::core::model::LogFile;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Filename glob selecting the captured stderr files.
    pub file_pattern: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            file_pattern: format!(
                "{}*",
                glob::Pattern::escape(constants::DEFAULT_FILE_PREFIX)
            ),
        }
    }
}

impl DiscoveryConfig {
    /// Select files by a literal name prefix (e.g. `stderr_`).
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            file_pattern: format!("{}*", glob::Pattern::escape(prefix)),
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover captured stderr files directly under `root`.
///
/// Returns every matching file (including empty ones, flagged by `size`)
/// sorted by ascending job id, so processing order does not depend on the
/// platform's directory listing order.
///
/// # Errors
/// `RootNotFound` / `NotADirectory` / `PermissionDenied` for a bad root,
/// `InvalidPattern` for a bad glob, `InvalidFileName` for a matching file with
/// no numeric id, `Traversal` if the directory listing itself fails.
pub fn discover_files(root: &Path, config: &DiscoveryConfig) -> Result<Vec<LogFile>, DiscoveryError> {
    // fs::metadata rather than Path::is_dir so access-denied is distinguishable
    // from not-found.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let pattern =
        glob::Pattern::new(&config.file_pattern).map_err(|e| DiscoveryError::InvalidPattern {
            pattern: config.file_pattern.clone(),
            source: e,
        })?;

    tracing::debug!(
        root = %root.display(),
        pattern = %config.file_pattern,
        "Discovery starting"
    );

    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry_result in walker {
        let entry = entry_result.map_err(|e| DiscoveryError::Traversal {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source: e,
        })?;

        let Some(file_name) = entry.file_name().to_str() else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-UTF-8 filename");
            continue;
        };
        if !pattern.matches(file_name) {
            tracing::trace!(file = file_name, "Not a captured stderr file");
            continue;
        }
        if !entry.file_type().is_file() {
            tracing::debug!(path = %entry.path().display(), "Skipping non-file entry");
            continue;
        }

        let id = parse_file_id(file_name).ok_or_else(|| DiscoveryError::InvalidFileName {
            path: entry.path().to_path_buf(),
        })?;
        let size = entry
            .metadata()
            .map_err(|e| DiscoveryError::Traversal {
                path: entry.path().to_path_buf(),
                source: e,
            })?
            .len();

        files.push(LogFile {
            path: entry.path().to_path_buf(),
            id,
            size,
        });
    }

    files.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));

    tracing::debug!(files = files.len(), "Discovery complete");
    Ok(files)
}

/// Parse the job id from `<prefix>_<id>.<ext>`.
///
/// The id is the integer between the last underscore and the extension.
pub fn parse_file_id(file_name: &str) -> Option<u64> {
    static FILE_ID: OnceLock<Regex> = OnceLock::new();
    let re = FILE_ID.get_or_init(|| {
        // Literal pattern, covered by the unit tests below.
        Regex::new(r"_([0-9]+)\.[^._]+$").expect("parse_file_id: invalid regex")
    });
    re.captures(file_name)?.get(1)?.as_str().parse().ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_log_dir() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("stderr_10.txt"), "a.py:1: UserWarning: Closing\n")
            .expect("write stderr_10");
        fs::write(root.join("stderr_2.txt"), "a.py:1: UserWarning: Closing\n")
            .expect("write stderr_2");
        fs::write(root.join("stderr_3.txt"), "").expect("write stderr_3");
        fs::write(root.join("stdout_2.txt"), "progress\n").expect("write stdout_2");
        fs::write(root.join("exclusions.json"), "[]").expect("write exclusions");

        let sub = root.join("stderr_archive");
        fs::create_dir(&sub).expect("mkdir");
        fs::write(sub.join("stderr_99.txt"), "nested\n").expect("write nested");
        dir
    }

    #[test]
    fn test_discovers_stderr_files_sorted_by_id() {
        let dir = make_log_dir();
        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let ids: Vec<u64> = files.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 3, 10], "got {files:?}");
    }

    #[test]
    fn test_empty_files_are_reported_with_zero_size() {
        let dir = make_log_dir();
        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let empty: Vec<u64> = files.iter().filter(|f| f.size == 0).map(|f| f.id).collect();
        assert_eq!(empty, vec![3]);
    }

    #[test]
    fn test_file_without_numeric_id_is_an_error() {
        let dir = make_log_dir();
        fs::write(dir.path().join("stderr_final.txt"), "x").unwrap();
        let result = discover_files(dir.path(), &DiscoveryConfig::default());
        assert!(
            matches!(result, Err(DiscoveryError::InvalidFileName { .. })),
            "expected InvalidFileName, got {result:?}"
        );
    }

    #[test]
    fn test_nonexistent_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_files(&dir.path().join("missing"), &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_is_a_file() {
        let dir = make_log_dir();
        let result = discover_files(&dir.path().join("stderr_2.txt"), &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_custom_prefix() {
        let dir = make_log_dir();
        let files = discover_files(dir.path(), &DiscoveryConfig::with_prefix("stdout_")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, 2);
    }

    #[test]
    fn test_parse_file_id() {
        assert_eq!(parse_file_id("stderr_17.txt"), Some(17));
        assert_eq!(parse_file_id("stderr_job_0042.log"), Some(42));
        assert_eq!(parse_file_id("stderr_17"), None);
        assert_eq!(parse_file_id("stderr_x.txt"), None);
    }
}
