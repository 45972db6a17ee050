// LogTriage - core/classify.rs
//
// The warning cascade: one message body in, one `Classification` out.
// Ordered prefix/substring checks, first match wins. Every known template is
// hard-coded; anything else is rejected so a new warning shape stops the run.
//
// Pure functions only. The caller owns the "last subject seen in this file"
// state that continuation messages depend on.

use crate::core::literal::parse_literal;
use crate::core::model::{Classification, ClassifiedWarning, Hemisphere, IgnoreReason, Tag};
use crate::util::constants::WARNING_MARKER;
use crate::util::error::MessageError;
use serde_json::Value;

/// Extract the message body from a captured stderr line.
///
/// Returns `None` when the line carries no warning marker (tracebacks, the
/// `warnings.warn(...)` source echo, progress output). The line is trimmed
/// first; a marker appearing more than once is malformed.
pub fn extract_message(line: &str) -> Option<Result<&str, MessageError>> {
    if !line.contains(WARNING_MARKER) {
        return None;
    }
    let mut parts = line.trim().split(WARNING_MARKER).skip(1);
    Some(match (parts.next(), parts.next()) {
        (Some(body), None) => Ok(body),
        (None, _) => Err(MessageError::malformed("warning marker lost after trimming")),
        (Some(_), Some(_)) => Err(MessageError::malformed("warning marker appears more than once")),
    })
}

/// Classify one message body.
///
/// `last_subject` is the subject of the most recent record in the same file;
/// it decides whether empty-label and save-failure messages are addenda.
pub fn classify_message(
    msg: &str,
    last_subject: Option<u64>,
) -> Result<Classification, MessageError> {
    if msg.starts_with("Closing") {
        return Ok(Classification::Ignored(IgnoreReason::Closing));
    }

    if msg.starts_with("No ") && msg.contains(" intersection for ") {
        let parts: Vec<&str> = after_last(msg, "intersection for ").split(" / ").collect();
        let [structure, subject, hemi] = at_least::<3>(&parts, "structure / subject / hemi")?;
        return record(
            Tag::MissingIntersection,
            structure,
            subject,
            hemi,
            msg,
            Some(words_at(msg, &[1, 3])?),
        );
    }

    for marker in ["inverted sector label: ", "inverted area label: "] {
        if msg.contains(&format!("{marker}(")) {
            return inverted_label(msg, marker);
        }
    }

    if msg.starts_with("eccen curves") {
        let parts: Vec<&str> = after_last(msg, " intersect for ").split(" / ").collect();
        let [structure, subject, hemi] = exactly::<3>(&parts, "structure / subject / hemi")?;
        return record(
            Tag::IllegalIntersection,
            structure,
            subject,
            hemi,
            msg,
            Some(words_at(msg, &[2, 4])?),
        );
    }

    if msg.starts_with("Bad ordering of ") {
        let parts: Vec<&str> = after_last(msg, " lines for ").split(" / ").collect();
        let [structure, subject, hemi, meta] =
            exactly::<4>(&parts, "structure / subject / hemi / detail")?;
        return record(
            Tag::Topological,
            structure,
            subject,
            hemi,
            after_last(msg, " for "),
            Some(Value::String(meta.to_string())),
        );
    }

    if msg.starts_with("Subject hemi has empty label: ") {
        return match last_subject {
            Some(_) => Ok(Classification::Continuation),
            None => Err(MessageError::ContinuationWithoutSubject),
        };
    }

    if msg.starts_with("Save failure for labels: ") {
        if last_subject.is_some() {
            return Ok(Classification::Continuation);
        }
        // No hemisphere in this template: record under lh and mirror to rh.
        let parts: Vec<&str> = after_last(msg, ": ").split(" / ").collect();
        let [structure, subject] = at_least::<2>(&parts, "structure / subject")?;
        let mut warning = build_warning(Tag::Unknown, structure, subject, "lh", msg, None)?;
        warning.both_hemispheres = true;
        return Ok(Classification::Record(warning));
    }

    if msg.starts_with("Could not separate ventral/dorsal ") {
        let words: Vec<&str> = msg.split(' ').collect();
        let last = words.last().copied().unwrap_or_default();
        let parts: Vec<&str> = last.split('/').collect();
        let [structure, subject, hemi] = exactly::<3>(&parts, "structure/subject/hemi")?;
        let meta = words
            .get(4)
            .ok_or_else(|| MessageError::malformed("too few words for ventral/dorsal detail"))?;
        return record(
            Tag::Topological,
            structure,
            subject,
            hemi,
            msg,
            Some(Value::String((*meta).to_string())),
        );
    }

    if msg.starts_with("cmag calc: subject hemi has empty label: ") {
        let tail = after_last(msg, ": ").trim();
        let parts: Vec<&str> = tail.split('/').collect();
        let [structure, subject, hemi, label] =
            exactly::<4>(&parts, "structure/subject/hemi/label")?;
        return record(
            Tag::Topological,
            structure,
            subject,
            hemi,
            tail,
            Some(Value::String(label.to_string())),
        );
    }

    if msg.contains("fixing non-zero BC to conform:") {
        return Ok(Classification::Ignored(IgnoreReason::BoundaryConditionFix));
    }

    if msg.contains("failed to render fsaverage path") {
        return Ok(Classification::Ignored(IgnoreReason::FsaveragePath));
    }

    if msg.contains("failed to render ") {
        let head = msg.split(':').next().unwrap_or_default();
        let parts: Vec<&str> = after_last(head, " path ").split('/').collect();
        let [structure, subject, hemi, path] =
            exactly::<4>(&parts, "structure/subject/hemi/path")?;
        return record(
            Tag::Mesh,
            structure,
            subject,
            hemi,
            msg,
            Some(Value::String(path.to_string())),
        );
    }

    if msg.contains("Incomplete set of lines for") {
        let parts: Vec<&str> = after_last(msg, " lines for ").split(" / ").collect();
        let [structure, subject, hemi] = exactly::<3>(&parts, "structure / subject / hemi")?;
        return record(Tag::Anatomist, structure, subject, hemi, msg, None);
    }

    Err(MessageError::Unrecognized)
}

/// "inverted sector/area label: (structure, subject, hemi, meta)".
fn inverted_label(msg: &str, marker: &str) -> Result<Classification, MessageError> {
    let literal = parse_literal(after_last(msg, marker))
        .map_err(|e| MessageError::malformed(format!("label tuple: {e}")))?;
    let Value::Array(items) = literal else {
        return Err(MessageError::malformed("label payload is not a tuple"));
    };
    let [structure, subject, hemi, meta]: [Value; 4] = items
        .try_into()
        .map_err(|v: Vec<Value>| {
            MessageError::malformed(format!("label tuple has {} fields, expected 4", v.len()))
        })?;

    let structure = match structure {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let subject = match subject {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| MessageError::malformed(format!("subject id {n} is not an integer")))?,
        Value::String(s) => parse_subject(&s)?,
        other => {
            return Err(MessageError::malformed(format!(
                "subject id {other} is not an integer"
            )))
        }
    };
    let hemisphere = match &hemi {
        Value::String(s) => parse_hemisphere(s)?,
        other => {
            return Err(MessageError::malformed(format!(
                "hemisphere {other} is not lh/rh"
            )))
        }
    };

    Ok(Classification::Record(ClassifiedWarning {
        tag: Tag::Topological,
        structure,
        subject,
        hemisphere,
        message: msg.to_string(),
        metadata: Some(meta),
        both_hemispheres: false,
    }))
}

fn record(
    tag: Tag,
    structure: &str,
    subject: &str,
    hemi: &str,
    message: &str,
    metadata: Option<Value>,
) -> Result<Classification, MessageError> {
    build_warning(tag, structure, subject, hemi, message, metadata).map(Classification::Record)
}

fn build_warning(
    tag: Tag,
    structure: &str,
    subject: &str,
    hemi: &str,
    message: &str,
    metadata: Option<Value>,
) -> Result<ClassifiedWarning, MessageError> {
    Ok(ClassifiedWarning {
        tag,
        structure: structure.to_string(),
        subject: parse_subject(subject)?,
        hemisphere: parse_hemisphere(hemi)?,
        message: message.to_string(),
        metadata,
        both_hemispheres: false,
    })
}

fn parse_subject(raw: &str) -> Result<u64, MessageError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| MessageError::malformed(format!("subject id '{raw}' is not an integer")))
}

fn parse_hemisphere(raw: &str) -> Result<Hemisphere, MessageError> {
    Hemisphere::parse(raw)
        .ok_or_else(|| MessageError::malformed(format!("hemisphere '{raw}' is not lh/rh")))
}

/// Text after the last occurrence of `pat`, or all of `s` if absent.
fn after_last<'a>(s: &'a str, pat: &str) -> &'a str {
    s.rsplit_once(pat).map_or(s, |(_, tail)| tail)
}

fn exactly<'a, const N: usize>(
    parts: &[&'a str],
    shape: &str,
) -> Result<[&'a str; N], MessageError> {
    <[&str; N]>::try_from(parts).map_err(|_| {
        MessageError::malformed(format!(
            "expected {N} fields ({shape}), found {}",
            parts.len()
        ))
    })
}

/// Like `exactly`, but extra trailing fields are ignored.
fn at_least<'a, const N: usize>(
    parts: &[&'a str],
    shape: &str,
) -> Result<[&'a str; N], MessageError> {
    match parts.get(..N) {
        Some(head) => exactly::<N>(head, shape),
        None => exactly::<N>(parts, shape),
    }
}

/// Pick space-separated words of `msg` by index, as a JSON string list.
fn words_at(msg: &str, indices: &[usize]) -> Result<Value, MessageError> {
    let words: Vec<&str> = msg.split(' ').collect();
    indices
        .iter()
        .map(|&i| {
            words
                .get(i)
                .map(|w| Value::String((*w).to_string()))
                .ok_or_else(|| MessageError::malformed(format!("message has no word {i}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_record(msg: &str) -> ClassifiedWarning {
        match classify_message(msg, None) {
            Ok(Classification::Record(w)) => w,
            other => panic!("expected a record for {msg:?}, got {other:?}"),
        }
    }

    fn key(w: &ClassifiedWarning) -> (&str, u64, Hemisphere, Tag) {
        (w.structure.as_str(), w.subject, w.hemisphere, w.tag)
    }

    #[test]
    fn test_extract_message() {
        let line = "  /opt/hcp/normalize.py:210: UserWarning: Closing session\n";
        assert_eq!(extract_message(line), Some(Ok("Closing session")));
        assert_eq!(extract_message("Traceback (most recent call last):"), None);
        assert!(matches!(
            extract_message("a.py:1: UserWarning: x: UserWarning: y"),
            Some(Err(MessageError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_closing_is_ignored() {
        assert_eq!(
            classify_message("Closing pool", None),
            Ok(Classification::Ignored(IgnoreReason::Closing))
        );
    }

    #[test]
    fn test_missing_intersection() {
        let w = classify_record("No V1 intersection for V2 / 100610 / lh");
        assert_eq!(key(&w), ("V2", 100610, Hemisphere::Lh, Tag::MissingIntersection));
        assert_eq!(w.metadata, Some(json!(["V1", "for"])));
        assert_eq!(w.message, "No V1 intersection for V2 / 100610 / lh");
    }

    #[test]
    fn test_missing_intersection_requires_exact_phrase() {
        let w = classify_record("No periphery-V3 intersection for V3 / 7 / rh");
        assert_eq!(w.metadata, Some(json!(["periphery-V3", "for"])));
        assert_eq!(key(&w), ("V3", 7, Hemisphere::Rh, Tag::MissingIntersection));
        assert_eq!(
            classify_message("No periphery-V3 intersection with dorsal for V3 / 7 / rh", None),
            Err(MessageError::Unrecognized)
        );
    }

    #[test]
    fn test_inverted_sector_label() {
        let w = classify_record("found inverted sector label: ('V1', 102311, 'rh', [4, 9])");
        assert_eq!(key(&w), ("V1", 102311, Hemisphere::Rh, Tag::Topological));
        assert_eq!(w.metadata, Some(json!([4, 9])));
    }

    #[test]
    fn test_inverted_area_label() {
        let w = classify_record("inverted area label: ('hV4', 5, 'lh', 'ventral')");
        assert_eq!(key(&w), ("hV4", 5, Hemisphere::Lh, Tag::Topological));
        assert_eq!(w.metadata, Some(json!("ventral")));
    }

    #[test]
    fn test_inverted_label_with_wrong_arity_is_malformed() {
        assert!(matches!(
            classify_message("inverted area label: ('hV4', 5, 'lh')", None),
            Err(MessageError::Malformed { .. })
        ));
    }

    #[test]
    fn test_eccen_curves() {
        let w = classify_record("eccen curves 1 and 2 intersect for V2 / 100206 / lh");
        assert_eq!(key(&w), ("V2", 100206, Hemisphere::Lh, Tag::IllegalIntersection));
        assert_eq!(w.metadata, Some(json!(["1", "2"])));
    }

    #[test]
    fn test_bad_ordering() {
        let w = classify_record("Bad ordering of V3 lines for V3 / 100307 / rh / dorsal");
        assert_eq!(key(&w), ("V3", 100307, Hemisphere::Rh, Tag::Topological));
        assert_eq!(w.message, "V3 / 100307 / rh / dorsal");
        assert_eq!(w.metadata, Some(json!("dorsal")));
    }

    #[test]
    fn test_empty_label_continuation() {
        assert_eq!(
            classify_message("Subject hemi has empty label: V1", Some(3)),
            Ok(Classification::Continuation)
        );
        assert_eq!(
            classify_message("Subject hemi has empty label: V1", None),
            Err(MessageError::ContinuationWithoutSubject)
        );
    }

    #[test]
    fn test_save_failure_without_context_covers_both_hemispheres() {
        let w = classify_record("Save failure for labels: V1 / 100408");
        assert_eq!(key(&w), ("V1", 100408, Hemisphere::Lh, Tag::Unknown));
        assert!(w.both_hemispheres);
        assert_eq!(w.metadata, None);
    }

    #[test]
    fn test_save_failure_with_context_is_continuation() {
        assert_eq!(
            classify_message("Save failure for labels: V1 / 100408", Some(100408)),
            Ok(Classification::Continuation)
        );
    }

    #[test]
    fn test_ventral_dorsal() {
        let w = classify_record("Could not separate ventral/dorsal V2 sectors for V2/100610/lh");
        assert_eq!(key(&w), ("V2", 100610, Hemisphere::Lh, Tag::Topological));
        assert_eq!(w.metadata, Some(json!("V2")));
    }

    #[test]
    fn test_cmag_empty_label() {
        let w = classify_record("cmag calc: subject hemi has empty label: V1/100610/rh/V1d ");
        assert_eq!(key(&w), ("V1", 100610, Hemisphere::Rh, Tag::Topological));
        assert_eq!(w.message, "V1/100610/rh/V1d");
        assert_eq!(w.metadata, Some(json!("V1d")));
    }

    #[test]
    fn test_benign_messages_are_ignored() {
        assert_eq!(
            classify_message("fixing non-zero BC to conform: 3 vertices", None),
            Ok(Classification::Ignored(IgnoreReason::BoundaryConditionFix))
        );
        assert_eq!(
            classify_message("failed to render fsaverage path V1/lh", Some(1)),
            Ok(Classification::Ignored(IgnoreReason::FsaveragePath))
        );
    }

    #[test]
    fn test_failed_render() {
        let w = classify_record("failed to render path V1/100610/lh/midgray: no vertices");
        assert_eq!(key(&w), ("V1", 100610, Hemisphere::Lh, Tag::Mesh));
        assert_eq!(w.metadata, Some(json!("midgray")));
    }

    #[test]
    fn test_incomplete_lines() {
        let w = classify_record("Incomplete set of lines for mean / 999999 / rh");
        assert_eq!(key(&w), ("mean", 999999, Hemisphere::Rh, Tag::Anatomist));
        assert_eq!(w.metadata, None);
    }

    #[test]
    fn test_unknown_message_is_rejected() {
        assert_eq!(
            classify_message("Something entirely new happened", Some(1)),
            Err(MessageError::Unrecognized)
        );
    }

    #[test]
    fn test_non_integer_subject_is_malformed() {
        assert!(matches!(
            classify_message("Incomplete set of lines for V1 / abc / lh", None),
            Err(MessageError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unknown_hemisphere_is_malformed() {
        assert!(matches!(
            classify_message("Incomplete set of lines for V1 / 12 / both", None),
            Err(MessageError::Malformed { .. })
        ));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let msg = "eccen curves 3 and 4 intersect for V3 / 11 / rh";
        assert_eq!(classify_message(msg, None), classify_message(msg, None));
    }
}
