// LogTriage - core/aggregate.rs
//
// Folds classified warnings into the exclusion set and the error notes.
// Core layer: receives file content as a string, never touches the filesystem.
//
// Continuation messages refer to the subject of the previous record in the
// same file, so that context is reset at every file boundary.

use crate::core::classify::{classify_message, extract_message};
use crate::core::model::{
    Classification, ClassifiedWarning, ErrorNotes, ErrorRecord, Exclusion, RunSummary,
};
use crate::util::constants;
use crate::util::error::ClassifyError;
use std::collections::BTreeSet;
use std::path::Path;

/// Result of a complete pass: the two outputs plus run counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Sorted, deduplicated exclusions.
    pub exclusions: Vec<Exclusion>,
    pub notes: ErrorNotes,
    pub summary: RunSummary,
}

/// Accumulates records across all files of a run.
#[derive(Debug, Default)]
pub struct Aggregator {
    exclusions: BTreeSet<Exclusion>,
    notes: ErrorNotes,
    summary: RunSummary,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a discovered file that was skipped because it is empty.
    pub fn skip_empty_file(&mut self, path: &Path) {
        tracing::debug!(file = %path.display(), "Skipping empty file");
        self.summary.files_found += 1;
        self.summary.files_empty += 1;
    }

    /// Classify every warning line in `content` (one captured stderr file).
    ///
    /// Stops at the first line that cannot be classified; the aggregator must
    /// then be discarded, since the run produces no partial output.
    pub fn process_file(&mut self, path: &Path, content: &str) -> Result<(), ClassifyError> {
        self.summary.files_found += 1;
        let mut last_subject: Option<u64> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_number = idx as u64 + 1;
            let Some(extracted) = extract_message(line) else {
                continue;
            };
            self.summary.warnings_seen += 1;

            let classified = extracted
                .and_then(|msg| classify_message(msg, last_subject))
                .map_err(|e| {
                    ClassifyError::from_message(
                        e,
                        path.to_path_buf(),
                        line_number,
                        preview(line.trim()),
                    )
                })?;

            match classified {
                Classification::Ignored(reason) => {
                    tracing::trace!(file = %path.display(), line = line_number, ?reason, "Ignored warning");
                    self.summary.ignored += 1;
                }
                Classification::Continuation => {
                    tracing::trace!(file = %path.display(), line = line_number, "Continuation warning");
                    self.summary.continuations += 1;
                }
                Classification::Record(warning) => {
                    tracing::debug!(
                        file = %path.display(),
                        line = line_number,
                        tag = %warning.tag,
                        subject = warning.subject,
                        hemi = %warning.hemisphere,
                        structure = %warning.structure,
                        "Recorded warning"
                    );
                    last_subject = Some(warning.subject);
                    self.add(&warning);
                }
            }
        }
        Ok(())
    }

    /// Fold one record into both outputs.
    pub fn add(&mut self, warning: &ClassifiedWarning) {
        if warning.structure != constants::MEAN_STRUCTURE {
            self.exclusions.insert(Exclusion {
                structure: warning.structure.clone(),
                subject: warning.subject,
                hemisphere: warning.hemisphere,
            });
        }

        let record = ErrorRecord::from(warning);
        if warning.both_hemispheres {
            self.notes.push(
                warning.subject,
                warning.hemisphere.other(),
                &warning.structure,
                record.clone(),
            );
        }
        self.notes
            .push(warning.subject, warning.hemisphere, &warning.structure, record);

        self.summary.records += 1;
        *self.summary.by_tag.entry(warning.tag).or_default() += 1;
    }

    /// Freeze the accumulated state.
    pub fn finish(self) -> Aggregate {
        let mut summary = self.summary;
        summary.exclusions = self.exclusions.len();
        summary.subjects = self.notes.subject_count();
        Aggregate {
            exclusions: self.exclusions.into_iter().collect(),
            notes: self.notes,
            summary,
        }
    }
}

/// Truncate a line for inclusion in an error message, on a char boundary.
fn preview(line: &str) -> String {
    match line.char_indices().nth(constants::MAX_LINE_PREVIEW) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
