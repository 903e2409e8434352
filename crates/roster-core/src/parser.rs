//! CSV reader for unit exports

use crate::error::{Error, Result};
use crate::table::{Column, RawRow, RawTable};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read a CSV file into a RawTable
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    read_table(BufReader::new(file), path.to_path_buf())
}

/// Read CSV text into a RawTable; `source_name` labels errors
pub fn read_csv_str(content: &str, source_name: &str) -> Result<RawTable> {
    read_table(content.as_bytes(), PathBuf::from(source_name))
}

fn read_table<R: Read>(reader: R, path: PathBuf) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Exports often have ragged trailing columns
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.trim().to_string(), i))
        .collect();

    if columns.iter().all(|c| c.name.is_empty()) {
        return Err(Error::CsvParse {
            path,
            message: "no columns found in CSV header".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;
        let line = record.position().map(|p| p.line());

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();

        // Pad short rows, truncate long ones
        while cells.len() < columns.len() {
            cells.push(String::new());
        }
        if cells.len() > columns.len() {
            warn!(
                line = line.unwrap_or_default(),
                source = %path.display(),
                "row has more cells than columns, truncating"
            );
            cells.truncate(columns.len());
        }

        rows.push(RawRow::new(line, cells));
    }

    Ok(RawTable {
        columns,
        rows,
        source_path: path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple_csv() {
        let csv = "Unit Name,Points Cost,Availability\nFlamecobs,20,1\nMounted Hetman,140,1\n";
        let table = read_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.columns[0].name, "Unit Name");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].get(0), Some("Mounted Hetman"));
        assert_eq!(table.rows[0].line, Some(2));
    }

    #[test]
    fn test_quoted_list_cells() {
        let csv = "name,keywords\nFlamecobs,\"[Infantry, Projectile, Red Cap]\"\n";
        let table = read_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.rows[0].get(1), Some("[Infantry, Projectile, Red Cap]"));
    }

    #[test]
    fn test_ragged_rows() {
        let csv = "name,points,availability\nShort,10\nLong,10,1,extra\n";
        let table = read_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.rows[0].cells, vec!["Short", "10", ""]);
        assert_eq!(table.rows[1].cells, vec!["Long", "10", "1"]);
    }

    #[test]
    fn test_empty_document_is_error() {
        let err = read_csv_str("", "empty.csv").unwrap_err();
        assert!(matches!(err, Error::CsvParse { .. }));
        assert!(err.to_string().contains("empty.csv"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv("/nonexistent/units.csv").unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
