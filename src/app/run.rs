// LogTriage - app/run.rs
//
// The single linear pass: discover → read → classify/aggregate → write.
//
// Nothing is written until every file has been classified and both outputs
// have serialised into memory, so a run that hits an unrecognised warning
// leaves the output directory exactly as it found it.

use crate::core::aggregate::{Aggregate, Aggregator};
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::export;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::{ExportError, LogTriageError, Result};
use std::path::{Path, PathBuf};

/// Options for one run, resolved from CLI arguments and config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding the captured stderr files.
    pub log_dir: PathBuf,
    /// Where outputs go; `None` means `log_dir`.
    pub output_dir: Option<PathBuf>,
    /// Classify only; write nothing.
    pub check_only: bool,
    pub file_prefix: String,
    pub exclusions_file: String,
    pub errors_file: String,
}

impl RunOptions {
    pub fn new(log_dir: PathBuf, config: &AppConfig) -> Self {
        Self {
            log_dir,
            output_dir: None,
            check_only: false,
            file_prefix: config.file_prefix.clone(),
            exclusions_file: config.exclusions_file.clone(),
            errors_file: config.errors_file.clone(),
        }
    }

    fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.log_dir)
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub aggregate: Aggregate,
    /// Output files written, in write order. Empty for `check_only`.
    pub written: Vec<PathBuf>,
}

/// Run the full pass.
pub fn run(options: &RunOptions) -> Result<RunOutcome> {
    let aggregate = classify_directory(
        &options.log_dir,
        &DiscoveryConfig::with_prefix(&options.file_prefix),
    )?;

    if options.check_only {
        tracing::info!("Check mode: no output written");
        return Ok(RunOutcome {
            aggregate,
            written: Vec::new(),
        });
    }

    let out_dir = options.output_dir();
    let exclusions_path = out_dir.join(&options.exclusions_file);
    let errors_path = out_dir.join(&options.errors_file);

    // Serialise both before touching the filesystem.
    let mut exclusions_buf = Vec::new();
    export::export_exclusions(&aggregate.exclusions, &mut exclusions_buf, &exclusions_path)?;
    let mut errors_buf = Vec::new();
    export::export_errors(&aggregate.notes, &mut errors_buf, &errors_path)?;

    std::fs::create_dir_all(out_dir).map_err(|e| LogTriageError::Io {
        path: out_dir.to_path_buf(),
        operation: "create output directory",
        source: e,
    })?;

    let mut written = Vec::with_capacity(2);
    for (path, buf) in [(exclusions_path, exclusions_buf), (errors_path, errors_buf)] {
        fs::write_atomic(&path, &buf).map_err(|e| ExportError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), bytes = buf.len(), "Wrote output");
        written.push(path);
    }

    Ok(RunOutcome { aggregate, written })
}

/// Discover, read, and classify every captured stderr file under `log_dir`.
pub fn classify_directory(log_dir: &Path, config: &DiscoveryConfig) -> Result<Aggregate> {
    let files = discovery::discover_files(log_dir, config)?;
    tracing::info!(
        dir = %log_dir.display(),
        files = files.len(),
        "Classifying captured warnings"
    );

    let mut aggregator = Aggregator::new();
    for file in &files {
        if file.size == 0 {
            aggregator.skip_empty_file(&file.path);
            continue;
        }
        let content = fs::read_file_lossy(&file.path).map_err(|e| LogTriageError::Io {
            path: file.path.clone(),
            operation: "read",
            source: e,
        })?;
        aggregator.process_file(&file.path, &content)?;
    }

    let aggregate = aggregator.finish();
    tracing::info!(
        files = aggregate.summary.files_found,
        empty = aggregate.summary.files_empty,
        warnings = aggregate.summary.warnings_seen,
        records = aggregate.summary.records,
        exclusions = aggregate.summary.exclusions,
        subjects = aggregate.summary.subjects,
        "Classification complete"
    );
    for (tag, count) in &aggregate.summary.by_tag {
        tracing::info!(tag = %tag, count, "Records by tag");
    }
    Ok(aggregate)
}
