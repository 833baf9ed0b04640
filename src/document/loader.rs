//! Document loading from plain text or JSON
//!
//! Plain text: one line per row, blank rows skipped, ids are positions.
//! JSON: `{"lines": [{"id", "text", "translation"?}], "milestones": {id: label}}`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{Document, LineId, LineItem};

#[derive(Debug, Deserialize)]
struct JsonDocument {
    lines: Vec<LineItem>,
    #[serde(default)]
    milestones: HashMap<LineId, String>,
}

/// Load a document from disk, picking the format from the file extension
pub fn load_document(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(&contents).with_context(|| format!("Invalid JSON document {}", path.display()))
    } else {
        Ok(parse_text(&contents))
    }
}

pub(crate) fn parse_text(contents: &str) -> Document {
    let mut doc = Document::new();
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        doc.push_text(line);
    }
    doc
}

fn parse_json(contents: &str) -> Result<Document> {
    let parsed: JsonDocument = serde_json::from_str(contents)?;

    let mut seen = HashSet::new();
    let mut doc = Document::new();
    for line in parsed.lines {
        if !seen.insert(line.id.clone()) {
            bail!("duplicate line id {:?}", line.id.as_str());
        }
        doc.push(line);
    }
    for (id, label) in parsed.milestones {
        doc.set_milestone(id, label);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_text_skips_blank_rows() {
        let doc = parse_text("おはよう\n\n  \nこんにちは\n");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get(1).unwrap().lock().text, "こんにちは");
    }

    #[test]
    fn test_parse_json_reindexes_and_keeps_translation() {
        let doc = parse_json(
            r#"{"lines": [
                {"id": "a", "index": 9, "text": "一", "translation": "one"},
                {"id": "b", "text": "二"}
            ], "milestones": {"b": "Scene 2"}}"#,
        )
        .unwrap();

        let first = doc.get(0).unwrap().lock().clone();
        assert_eq!(first.index, 0);
        assert_eq!(first.translation.as_deref(), Some("one"));
        assert_eq!(doc.milestone(&LineId::new("b")), Some("Scene 2"));
    }

    #[test]
    fn test_parse_json_rejects_duplicate_ids() {
        let err = parse_json(r#"{"lines": [{"id": "a", "text": "x"}, {"id": "a", "text": "y"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate line id"));
    }

    #[test]
    fn test_load_document_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"lines": [{{"id": "only", "text": "テスト"}}]}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc.get(0).unwrap().lock().id, LineId::new("only"));
    }

    #[test]
    fn test_load_document_missing_file() {
        let err = load_document(Path::new("/nonexistent/transcript.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read document"));
    }
}
