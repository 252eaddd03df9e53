//! Spreadsheet payloads. Cells are rendered to the same text the CSV files
//! carry so both formats share one decoder.

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx, XlsxError};
use chrono::NaiveDate;
use std::io::Cursor;

use crate::error::{FetchError, FetchResult};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

pub(crate) fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

fn malformed(e: XlsxError) -> FetchError {
    FetchError::Malformed(format!("workbook: {}", e))
}

pub(crate) fn first_sheet_rows(bytes: &[u8]) -> FetchResult<Vec<Vec<String>>> {
    let mut book: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(malformed)?;
    let range = book
        .worksheet_range_at(0)
        .ok_or_else(|| FetchError::Malformed("workbook has no sheets".to_string()))?
        .map_err(malformed)?;

    let mut rows = Vec::with_capacity(range.height());
    for (r, row) in range.rows().enumerate() {
        let mut cells = Vec::with_capacity(row.len());
        for (c, cell) in row.iter().enumerate() {
            cells.push(render_cell(cell).ok_or_else(|| {
                FetchError::Malformed(format!("workbook cell ({}, {}): {:?}", r + 1, c + 1, cell))
            })?);
        }
        rows.push(cells);
    }
    Ok(rows)
}

/// Date cells become `m/d/yyyy` labels; error cells are rejected.
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => Some(String::new()),
        Data::String(s) => Some(s.clone()),
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(v.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.format("%-m/%-d/%Y").to_string()),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.format("%-m/%-d/%Y").to_string()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_zip_signature() {
        assert!(is_workbook(b"PK\x03\x04rest"));
        assert!(!is_workbook(b"Province/State,Country/Region\n"));
        assert!(!is_workbook(b""));
    }

    #[test]
    fn cells_render_like_csv_text() {
        assert_eq!(render_cell(&Data::Float(12.0)).as_deref(), Some("12"));
        assert_eq!(render_cell(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(render_cell(&Data::Empty).as_deref(), Some(""));
        assert_eq!(
            render_cell(&Data::DateTimeIso("2020-01-24T00:00:00".to_string())).as_deref(),
            Some("1/24/2020")
        );
    }

    #[test]
    fn garbage_zip_is_malformed() {
        let err = first_sheet_rows(b"PK\x03\x04not really a zip").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
