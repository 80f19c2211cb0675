//! Stream attribute tables.
//!
//! # Overview
//!
//! The network index only needs two integer columns per stream feature:
//! the segment id (`cat`) and the downstream segment id (`tostream`). This
//! module reads them from two text layouts:
//!
//! - **Delimited**: a header row followed by one row per feature, as printed
//!   by `v.db.select` (`|` separated by default). Extra columns are ignored.
//! - **JSON**: an array of objects keyed by column name, e.g.
//!   `[{"cat": 1, "tostream": 0}]`. Values may be numbers or numeric strings.
//!
//! Errors carry the line (delimited) or row index (JSON) of the bad value.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::network::{SegmentId, SegmentLink};

/// Names of the id and downstream-id columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub id: String,
    pub downstream: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "cat".to_string(),
            downstream: "tostream".to_string(),
        }
    }
}

/// Errors from parsing an attribute table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("attribute table is empty (no header row)")]
    MissingHeader,

    #[error("column `{column}` not found in table header")]
    MissingColumn { column: String },

    #[error("line {line}: expected at least {expected} fields, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: column `{column}` value {value:?} is not a segment id")]
    BadValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("invalid JSON table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON table must be an array of objects")]
    NotAnArray,

    #[error("row {row}: {reason}")]
    BadRow { row: usize, reason: String },
}

/// Something that can produce the `(id, downstream)` rows of a network.
pub trait AttributeSource {
    /// Load every stream row.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load_links(&self, columns: &ColumnNames) -> Result<Vec<SegmentLink>>;
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Parse a delimited table with a header row.
///
/// Blank lines are skipped. Fields are trimmed before conversion.
///
/// # Errors
///
/// Returns [`TableError`] for a missing header or column, a short row, or a
/// value that is not a non-negative integer.
pub fn parse_delimited(
    text: &str,
    separator: char,
    columns: &ColumnNames,
) -> Result<Vec<SegmentLink>, TableError> {
    let mut rows = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = rows.next().ok_or(TableError::MissingHeader)?;
    let header: Vec<&str> = header.split(separator).map(str::trim).collect();
    let id_col = find_column(&header, &columns.id)?;
    let down_col = find_column(&header, &columns.downstream)?;
    let needed = id_col.max(down_col) + 1;

    let mut links = Vec::new();
    for (line_no, row) in rows {
        let fields: Vec<&str> = row.split(separator).map(str::trim).collect();
        if fields.len() < needed {
            return Err(TableError::ShortRow {
                line: line_no,
                expected: needed,
                found: fields.len(),
            });
        }
        let id = parse_id(fields[id_col], line_no, &columns.id)?;
        let downstream = parse_id(fields[down_col], line_no, &columns.downstream)?;
        links.push(SegmentLink::new(id, downstream));
    }

    debug!(rows = links.len(), "parsed delimited attribute table");
    Ok(links)
}

fn find_column(header: &[&str], name: &str) -> Result<usize, TableError> {
    header
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| TableError::MissingColumn {
            column: name.to_string(),
        })
}

fn parse_id(raw: &str, line: usize, column: &str) -> Result<SegmentId, TableError> {
    raw.parse::<SegmentId>().map_err(|_| TableError::BadValue {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Parse a JSON array of row objects.
///
/// # Errors
///
/// Returns [`TableError`] if the text is not a JSON array of objects, or a
/// row lacks a column or holds a value that is not a non-negative integer.
pub fn parse_json(text: &str, columns: &ColumnNames) -> Result<Vec<SegmentLink>, TableError> {
    let value: Value = serde_json::from_str(text)?;
    let rows = value.as_array().ok_or(TableError::NotAnArray)?;

    let links = rows
        .iter()
        .enumerate()
        .map(|(row, obj)| {
            let obj = obj.as_object().ok_or_else(|| TableError::BadRow {
                row,
                reason: "not an object".to_string(),
            })?;
            let id = json_id(obj.get(&columns.id), row, &columns.id)?;
            let downstream = json_id(obj.get(&columns.downstream), row, &columns.downstream)?;
            Ok(SegmentLink::new(id, downstream))
        })
        .collect::<Result<Vec<_>, TableError>>()?;

    debug!(rows = links.len(), "parsed JSON attribute table");
    Ok(links)
}

fn json_id(value: Option<&Value>, row: usize, column: &str) -> Result<SegmentId, TableError> {
    let bad = |reason: String| TableError::BadRow { row, reason };
    let text = match value {
        None => return Err(bad(format!("missing column `{column}`"))),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };
    let Ok(id) = text.parse() else {
        return Err(bad(format!("`{column}` value {text:?} is not a segment id")));
    };
    Ok(id)
}

// ---------------------------------------------------------------------------
// Table files
// ---------------------------------------------------------------------------

/// On-disk layout of an attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited { separator: char },
    Json,
}

impl TableFormat {
    /// `.json` files are JSON; anything else is delimited with `separator`.
    #[must_use]
    pub fn from_path(path: &Path, separator: char) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::Json
        } else {
            Self::Delimited { separator }
        }
    }
}

/// An attribute table exported to a file.
#[derive(Debug, Clone)]
pub struct TableFile {
    pub path: PathBuf,
    pub format: TableFormat,
}

impl TableFile {
    /// A table file whose format follows its extension.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, separator: char) -> Self {
        let path = path.into();
        let format = TableFormat::from_path(&path, separator);
        Self { path, format }
    }
}

impl AttributeSource for TableFile {
    fn load_links(&self, columns: &ColumnNames) -> Result<Vec<SegmentLink>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let links = match self.format {
            TableFormat::Delimited { separator } => parse_delimited(&text, separator, columns),
            TableFormat::Json => parse_json(&text, columns),
        }
        .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(links)
    }
}
