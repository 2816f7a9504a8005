//! Delimiter-aware CSV table loading.
//!
//! Clinical exports arrive with inconsistent whitespace, BOM-prefixed
//! headers and the occasional short row, so cells are normalized on read
//! and rows are padded to the header width.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Index of a header, exact match after normalization.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a CSV file with the given field delimiter.
///
/// The first non-blank row is the header; fully blank rows are dropped;
/// short rows are padded with empty cells to the header width.
pub fn read_csv_table(path: &Path, delimiter: u8) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(CsvTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }

    let headers: Vec<String> = raw_rows[0].iter().map(|v| normalize_header(v)).collect();
    let mut rows = Vec::with_capacity(raw_rows.len() - 1);
    for record in raw_rows.iter().skip(1) {
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).cloned().unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(CsvTable { headers, rows })
}
