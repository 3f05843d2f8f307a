//! CSV record reader for dictionary imports.
//!
//! Expected layout: a header row naming `term`, `definition` and `path`
//! (case-sensitive, any order, extra columns ignored), then one word per row.

use crate::import::path::parse_category_path;
use crate::import::{ImportError, ImportRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

/// Column names every import file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["term", "definition", "path"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Deserialize)]
struct RawImportRow {
    term: Option<String>,
    definition: Option<String>,
    path: Option<String>,
}

/// Parses and validates every data row of `bytes`.
///
/// Fails on the first invalid row; no partial batch is returned.
pub fn read_import_records(bytes: &[u8]) -> Result<Vec<ImportRecord>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    ensure_required_columns(&headers)?;

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    while reader.read_record(&mut row)? {
        let line = row.position().map_or(0, |position| position.line());
        let raw: RawImportRow = row.deserialize(Some(&headers))?;
        records.push(validate_row(raw, line)?);
    }
    Ok(records)
}

fn ensure_required_columns(headers: &StringRecord) -> Result<(), ImportError> {
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::MissingColumns(missing))
    }
}

fn validate_row(raw: RawImportRow, line: u64) -> Result<ImportRecord, ImportError> {
    let (Some(term), Some(definition), Some(path)) = (
        non_blank(raw.term),
        non_blank(raw.definition),
        non_blank(raw.path),
    ) else {
        return Err(ImportError::MissingFields { line });
    };

    let path = parse_category_path(&path)
        .map_err(|source| ImportError::InvalidPath { line, source })?;
    Ok(ImportRecord {
        term,
        definition,
        path,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
