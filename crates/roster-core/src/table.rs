//! Raw table types for CSV exports before normalization

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A parsed CSV document, header row plus string cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    /// Column definitions from the header row
    pub columns: Vec<Column>,
    /// Data rows, in file order
    pub rows: Vec<RawRow>,
    /// Source file path or caller-supplied source name
    pub source_path: PathBuf,
}

impl RawTable {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by exact header name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Header-keyed view of one row
    pub fn record(&self, row: &RawRow) -> RowRecord {
        RowRecord::from_pairs(
            self.columns
                .iter()
                .map(|c| (c.name.as_str(), row.get(c.index).unwrap_or(""))),
        )
    }

    /// Header-keyed views of every row, in file order
    pub fn records(&self) -> impl Iterator<Item = RowRecord> + '_ {
        self.rows.iter().map(move |r| self.record(r))
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Header text as written in the file (e.g. "Unit Name")
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of raw cell text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based line of the record in the source, when known
    pub line: Option<u64>,
    /// Cell values for each column
    pub cells: Vec<String>,
}

impl RawRow {
    /// Create a new row
    pub fn new(line: Option<u64>, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// One row keyed by header name
///
/// Lookups go through [`RowRecord::lookup`], which compares header names
/// ignoring case and punctuation so `"Unit Name"`, `unit_name` and `unitName`
/// all reach the same cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    cells: BTreeMap<String, String>,
}

impl RowRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from (header, value) pairs; later duplicates win
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a cell
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(header.into(), value.into());
    }

    /// Get a cell by exact header name
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    /// First non-empty cell whose header matches any of `aliases`
    ///
    /// Aliases are tried in order, so earlier aliases take priority.
    pub fn lookup<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            let wanted = header_key(alias.as_ref());
            self.cells
                .iter()
                .find(|(h, v)| header_key(h) == wanted && !v.trim().is_empty())
                .map(|(_, v)| v.trim())
        })
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the record has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header comparison key: lowercase alphanumerics only
pub fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
