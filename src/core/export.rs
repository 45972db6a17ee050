// LogTriage - core/export.rs
//
// JSON serialisation of the two run outputs.
// Core layer: writes to any Write trait object. The app layer serialises
// into memory first and only touches the output directory once every
// output has serialised successfully.

use crate::core::model::{ErrorNotes, Exclusion};
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Export the exclusion list as an array of `[structure, subject, hemi]`.
///
/// Returns the number of exclusions written.
pub fn export_exclusions<W: Write>(
    exclusions: &[Exclusion],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    write_pretty(exclusions, writer, export_path)?;
    Ok(exclusions.len())
}

/// Export the error notes keyed by subject id.
///
/// Returns the number of subjects written.
pub fn export_errors<W: Write>(
    notes: &ErrorNotes,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    write_pretty(notes, writer, export_path)?;
    Ok(notes.subject_count())
}

fn write_pretty<T, W>(value: &T, mut writer: W, export_path: &Path) -> Result<(), ExportError>
where
    T: Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ErrorRecord, Hemisphere, Tag};
    use serde_json::{json, Value};

    #[test]
    fn test_exclusions_export() {
        let exclusions = vec![
            Exclusion {
                structure: "V1".to_string(),
                subject: 100206,
                hemisphere: Hemisphere::Lh,
            },
            Exclusion {
                structure: "V2".to_string(),
                subject: 100206,
                hemisphere: Hemisphere::Rh,
            },
        ];
        let mut buf = Vec::new();
        let count = export_exclusions(&exclusions, &mut buf, Path::new("exclusions.json")).unwrap();
        assert_eq!(count, 2);

        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, json!([["V1", 100206, "lh"], ["V2", 100206, "rh"]]));
    }

    #[test]
    fn test_errors_export() {
        let mut notes = ErrorNotes::default();
        notes.push(
            100206,
            Hemisphere::Rh,
            "V3",
            ErrorRecord {
                tag: Tag::Topological,
                message: "V3 / 100206 / rh / dorsal".to_string(),
                metadata: Some(json!("dorsal")),
            },
        );
        let mut buf = Vec::new();
        let count = export_errors(&notes, &mut buf, Path::new("errors.json")).unwrap();
        assert_eq!(count, 1);

        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            parsed,
            json!({
                "100206": {
                    "rh": {
                        "V3": [{
                            "tag": "topological",
                            "message": "V3 / 100206 / rh / dorsal",
                            "metadata": "dorsal"
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn test_empty_outputs() {
        let mut buf = Vec::new();
        export_exclusions(&[], &mut buf, Path::new("exclusions.json")).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim(), "[]");

        let mut buf = Vec::new();
        export_errors(&ErrorNotes::default(), &mut buf, Path::new("errors.json")).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim(), "{}");
    }
}
