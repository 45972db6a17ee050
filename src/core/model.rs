// LogTriage - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers: the classifier
// produces `Classification`s, the aggregator folds them into `Exclusion`s and
// `ErrorNotes`, and the exporter serialises those two.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Hemisphere
// =============================================================================

/// Left or right cortical hemisphere.
///
/// Ordered `Lh < Rh` so sorted exclusions match plain string ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    Lh,
    Rh,
}

impl Hemisphere {
    /// Parse the `lh`/`rh` token used in warning messages.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "lh" => Some(Self::Lh),
            "rh" => Some(Self::Rh),
            _ => None,
        }
    }

    /// The opposite hemisphere.
    pub fn other(self) -> Self {
        match self {
            Self::Lh => Self::Rh,
            Self::Rh => Self::Lh,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lh => "lh",
            Self::Rh => "rh",
        }
    }
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Tag
// =============================================================================

/// Error category assigned by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Tag {
    /// Two boundary lines that should cross never do.
    #[serde(rename = "missing intersection")]
    MissingIntersection,

    /// Label geometry is folded, inverted, or out of order.
    #[serde(rename = "topological")]
    Topological,

    /// Eccentricity curves cross a line they must not touch.
    #[serde(rename = "illegal intersection")]
    IllegalIntersection,

    /// Labels could not be saved; cause not determined from the log.
    #[serde(rename = "unknown")]
    Unknown,

    /// A surface path could not be rendered onto the mesh.
    #[serde(rename = "mesh")]
    Mesh,

    /// The hand-drawn line set is incomplete.
    #[serde(rename = "anatomist")]
    Anatomist,
}

impl Tag {
    /// The string written to `errors.json`.
    pub fn label(&self) -> &'static str {
        match self {
            Tag::MissingIntersection => "missing intersection",
            Tag::Topological => "topological",
            Tag::IllegalIntersection => "illegal intersection",
            Tag::Unknown => "unknown",
            Tag::Mesh => "mesh",
            Tag::Anatomist => "anatomist",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Classification outcome
// =============================================================================

/// Known warning shapes that are deliberately not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IgnoreReason {
    /// "Closing ..." bookkeeping message.
    Closing,
    /// "fixing non-zero BC to conform:" boundary-condition adjustment.
    BoundaryConditionFix,
    /// fsaverage paths are rendered for completeness only.
    FsaveragePath,
}

/// A warning message parsed into its error fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedWarning {
    pub tag: Tag,
    pub structure: String,
    pub subject: u64,
    pub hemisphere: Hemisphere,
    /// Message text recorded in the error notes.
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    /// Record the same entry under the opposite hemisphere as well.
    pub both_hemispheres: bool,
}

/// Outcome of classifying one warning message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Recognised, not an error.
    Ignored(IgnoreReason),
    /// Addendum to the previous record in the same file; nothing to record.
    Continuation,
    /// A new error record.
    Record(ClassifiedWarning),
}

// =============================================================================
// Outputs
// =============================================================================

/// One entry in `errors.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub tag: Tag,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl From<&ClassifiedWarning> for ErrorRecord {
    fn from(w: &ClassifiedWarning) -> Self {
        Self {
            tag: w.tag,
            message: w.message.clone(),
            metadata: w.metadata.clone(),
        }
    }
}

/// A structure/subject/hemisphere triple to drop from downstream analysis.
///
/// Serialised as a 3-element JSON array `[structure, subject, hemi]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion {
    pub structure: String,
    pub subject: u64,
    pub hemisphere: Hemisphere,
}

impl Serialize for Exclusion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.structure, self.subject, self.hemisphere).serialize(serializer)
    }
}

/// Per-hemisphere notes: structure name → ordered records.
pub type StructureNotes = BTreeMap<String, Vec<ErrorRecord>>;

/// Subject → hemisphere → structure → ordered error records.
///
/// Integer subject keys serialise as JSON object keys (strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorNotes {
    pub subjects: BTreeMap<u64, BTreeMap<Hemisphere, StructureNotes>>,
}

impl ErrorNotes {
    /// Append `record` to notes[subject][hemisphere][structure].
    pub fn push(
        &mut self,
        subject: u64,
        hemisphere: Hemisphere,
        structure: &str,
        record: ErrorRecord,
    ) {
        self.subjects
            .entry(subject)
            .or_default()
            .entry(hemisphere)
            .or_default()
            .entry(structure.to_string())
            .or_default()
            .push(record);
    }

    /// Records for one subject/hemisphere/structure, if any.
    pub fn records(
        &self,
        subject: u64,
        hemisphere: Hemisphere,
        structure: &str,
    ) -> Option<&[ErrorRecord]> {
        self.subjects
            .get(&subject)?
            .get(&hemisphere)?
            .get(structure)
            .map(Vec::as_slice)
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn record_count(&self) -> usize {
        self.subjects
            .values()
            .flat_map(|hemis| hemis.values())
            .flat_map(|structs| structs.values())
            .map(Vec::len)
            .sum()
    }
}

// =============================================================================
// Discovery / run bookkeeping
// =============================================================================

/// A captured stderr file found in the log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    /// Numeric job id parsed from `stderr_<id>.<ext>`.
    pub id: u64,
    pub size: u64,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_empty: usize,
    pub warnings_seen: usize,
    pub ignored: usize,
    pub continuations: usize,
    pub records: usize,
    pub exclusions: usize,
    pub subjects: usize,
    pub by_tag: BTreeMap<Tag, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hemisphere_parse_and_other() {
        assert_eq!(Hemisphere::parse("lh"), Some(Hemisphere::Lh));
        assert_eq!(Hemisphere::parse("rh"), Some(Hemisphere::Rh));
        assert_eq!(Hemisphere::parse("LH"), None);
        assert_eq!(Hemisphere::Lh.other(), Hemisphere::Rh);
        assert_eq!(Hemisphere::Rh.other(), Hemisphere::Lh);
    }

    #[test]
    fn test_exclusion_serialises_as_array() {
        let ex = Exclusion {
            structure: "V1".to_string(),
            subject: 100610,
            hemisphere: Hemisphere::Rh,
        };
        let json = serde_json::to_string(&ex).unwrap();
        assert_eq!(json, r#"["V1",100610,"rh"]"#);
    }

    #[test]
    fn test_error_record_omits_missing_metadata() {
        let rec = ErrorRecord {
            tag: Tag::Anatomist,
            message: "Incomplete set of lines for V1 / 1 / lh".to_string(),
            metadata: None,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("metadata"), "{json}");
        assert!(json.contains(r#""tag":"anatomist""#), "{json}");
    }

    #[test]
    fn test_error_notes_keys_are_strings() {
        let mut notes = ErrorNotes::default();
        notes.push(
            42,
            Hemisphere::Lh,
            "V2",
            ErrorRecord {
                tag: Tag::Mesh,
                message: "m".to_string(),
                metadata: Some(serde_json::json!("x")),
            },
        );
        let value = serde_json::to_value(&notes).unwrap();
        assert_eq!(value["42"]["lh"]["V2"][0]["tag"], "mesh");
        assert_eq!(notes.record_count(), 1);
        assert_eq!(notes.subject_count(), 1);
        assert_eq!(notes.records(42, Hemisphere::Lh, "V2").map(<[_]>::len), Some(1));
        assert!(notes.records(42, Hemisphere::Rh, "V2").is_none());
    }
}
