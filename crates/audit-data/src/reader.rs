//! Input discovery and loading for audit rows.
//!
//! Accepts `.json` files holding an array of objects and `.jsonl` files with
//! one object per line, either directly or found by walking directories.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use audit_core::error::{AuditError, Result};
use audit_core::models::Row;
use serde_json::{Map, Value};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Expand `input` into the row files it names, sorted by path.
///
/// A file is returned as-is; a directory is walked recursively for `.json`
/// and `.jsonl` files. A missing path yields nothing.
pub fn find_input_files(input: &Path) -> Vec<PathBuf> {
    if !input.exists() {
        warn!("Input path does not exist: {}", input.display());
        return Vec::new();
    }
    if input.is_file() {
        return vec![input.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_row_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every row from `inputs`, in input order then file order.
///
/// Fails with [`AuditError::InputTooLarge`] as soon as a row past `max_rows`
/// is read; JSONL files are streamed, so the bound holds while loading.
pub fn load_rows(inputs: &[PathBuf], max_rows: usize) -> Result<Vec<Row>> {
    let files: Vec<PathBuf> = inputs.iter().flat_map(|p| find_input_files(p)).collect();
    if files.is_empty() {
        let shown = inputs.first().cloned().unwrap_or_else(|| PathBuf::from("."));
        return Err(AuditError::NoInputFiles(shown));
    }

    let mut rows = Vec::new();
    for file in &files {
        let before = rows.len();
        load_file_into(file, &mut rows, max_rows)?;
        debug!("File {}: {} rows", file.display(), rows.len() - before);
    }
    debug!("Loaded {} rows from {} files", rows.len(), files.len());
    Ok(rows)
}

/// Load the rows of a single file, choosing the format by extension.
pub fn load_file(path: &Path) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    load_file_into(path, &mut rows, usize::MAX)?;
    Ok(rows)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().map(|e| e == ext).unwrap_or(false)
}

fn is_row_file(path: &Path) -> bool {
    has_extension(path, "json") || has_extension(path, "jsonl")
}

fn load_file_into(path: &Path, rows: &mut Vec<Row>, max_rows: usize) -> Result<()> {
    let file = File::open(path).map_err(|source| AuditError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    if has_extension(path, "jsonl") {
        read_jsonl(path, reader, rows, max_rows)
    } else {
        let document: Value = serde_json::from_reader(reader)?;
        push_json_document(path, document, rows, max_rows)
    }
}

/// Append `row` unless `rows` already holds `max_rows`.
fn push_row(rows: &mut Vec<Row>, row: Row, max_rows: usize) -> Result<()> {
    if rows.len() >= max_rows {
        return Err(AuditError::InputTooLarge { limit: max_rows });
    }
    rows.push(row);
    Ok(())
}

/// One object per line; blank, malformed and non-object lines are skipped.
fn read_jsonl(
    path: &Path,
    reader: impl BufRead,
    rows: &mut Vec<Row>,
    max_rows: usize,
) -> Result<()> {
    let mut skipped = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|source| AuditError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => push_row(rows, object_to_row(&map), max_rows)?,
            Ok(_) => skipped += 1,
            Err(e) => {
                debug!("Failed to parse JSON line in {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        debug!("File {}: {} lines skipped", path.display(), skipped);
    }
    Ok(())
}

/// A top-level array of objects, or a single object.
fn push_json_document(
    path: &Path,
    document: Value,
    rows: &mut Vec<Row>,
    max_rows: usize,
) -> Result<()> {
    match document {
        Value::Array(items) => {
            for item in &items {
                let Value::Object(map) = item else {
                    return Err(AuditError::InvalidRow {
                        path: path.to_path_buf(),
                        found: json_kind(item).to_string(),
                    });
                };
                push_row(rows, object_to_row(map), max_rows)?;
            }
            Ok(())
        }
        Value::Object(map) => push_row(rows, object_to_row(&map), max_rows),
        other => Err(AuditError::InvalidRow {
            path: path.to_path_buf(),
            found: json_kind(&other).to_string(),
        }),
    }
}

/// Flatten a JSON object into string cells; `null` cells are dropped.
fn object_to_row(map: &Map<String, Value>) -> Row {
    map.iter()
        .filter_map(|(key, value)| {
            let cell = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), cell))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    // ── find_input_files ──────────────────────────────────────────────────────

    #[test]
    fn test_find_input_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("week-10");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "b.jsonl", &["{}"]);
        write_file(dir.path(), "a.json", &["[]"]);
        write_file(&sub, "c.jsonl", &["{}"]);
        write_file(dir.path(), "notes.txt", &["ignored"]);

        let files = find_input_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.jsonl", "c.jsonl"]);
    }

    #[test]
    fn test_find_input_files_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.txt", &["[]"]);
        assert_eq!(find_input_files(&path), vec![path]);
    }

    #[test]
    fn test_find_input_files_nonexistent_path() {
        let files = find_input_files(Path::new("/tmp/does-not-exist-audit-report-xyz"));
        assert!(files.is_empty());
    }

    // ── load_file ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_jsonl_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "rows.jsonl",
            &[
                r#"{"人审状态": "拒绝", "送审时间": "2024-03-01"}"#,
                "{broken",
                "",
                "42",
                r#"{"人审状态": ""}"#,
            ],
        );

        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["人审状态"], "拒绝");
    }

    #[test]
    fn test_load_json_array_stringifies_scalars() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "rows.json",
            &[r#"[{"count": 3, "flag": true, "tags": null, "name": "x"}]"#],
        );

        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["count"], "3");
        assert_eq!(rows[0]["flag"], "true");
        assert_eq!(rows[0]["name"], "x");
        assert!(!rows[0].contains_key("tags"));
    }

    #[test]
    fn test_load_json_array_rejects_non_objects() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "rows.json", &[r#"[{"a": "1"}, 7]"#]);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, AuditError::InvalidRow { .. }));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_load_json_invalid_document() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "rows.json", &["[{"]);
        assert!(matches!(
            load_file(&path).unwrap_err(),
            AuditError::JsonParse(_)
        ));
    }

    // ── load_rows ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_rows_concatenates_in_order() {
        let dir = TempDir::new().unwrap();
        let first = write_file(dir.path(), "1.jsonl", &[r#"{"n": "1"}"#, r#"{"n": "2"}"#]);
        let second = write_file(dir.path(), "2.json", &[r#"[{"n": "3"}]"#]);

        let rows = load_rows(&[second, first], 100).unwrap();
        let ns: Vec<&str> = rows.iter().map(|r| r["n"].as_str()).collect();
        assert_eq!(ns, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_load_rows_no_files_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_rows(&[dir.path().to_path_buf()], 100).unwrap_err();
        assert!(matches!(err, AuditError::NoInputFiles(_)));
    }

    #[test]
    fn test_load_rows_at_limit_is_ok() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "rows.jsonl", &[r#"{"n": "1"}"#, r#"{"n": "2"}"#]);
        assert_eq!(load_rows(&[path], 2).unwrap().len(), 2);
    }

    #[test]
    fn test_load_rows_stops_past_limit_in_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "rows.jsonl",
            &[r#"{"n": "1"}"#, r#"{"n": "2"}"#, r#"{"n": "3"}"#],
        );
        let err = load_rows(&[path], 2).unwrap_err();
        assert!(matches!(err, AuditError::InputTooLarge { limit: 2 }));
    }

    #[test]
    fn test_load_rows_limit_spans_files() {
        let dir = TempDir::new().unwrap();
        let first = write_file(dir.path(), "1.jsonl", &[r#"{"n": "1"}"#, r#"{"n": "2"}"#]);
        let second = write_file(dir.path(), "2.json", &[r#"[{"n": "3"}, {"n": "4"}]"#]);
        let err = load_rows(&[first, second], 3).unwrap_err();
        assert!(matches!(err, AuditError::InputTooLarge { limit: 3 }));
    }

    #[test]
    fn test_load_rows_limit_applies_to_json_arrays() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "rows.json", &[r#"[{"n": "1"}, {"n": "2"}]"#]);
        let err = load_rows(&[path], 1).unwrap_err();
        assert!(matches!(err, AuditError::InputTooLarge { limit: 1 }));
    }
}
