//! Raw case tables as downloaded: one row per reporting region, one column
//! per calendar date, cumulative counts in the cells.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{FetchError, FetchResult};

pub mod dates;
pub mod normalize;
mod workbook;

pub const COUNTRY_COLUMN: &str = "Country/Region";
pub const PROVINCE_COLUMN: &str = "Province/State";
/// Non-temporal columns present in the global time series files.
pub const METADATA_COLUMNS: [&str; 3] = ["Lat", "Long", "Long_"];

/// Which header columns identify the entity and which ones to ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    pub entity_column: String,
    /// Keep only rows whose `parent.0` column equals `parent.1`
    pub parent: Option<(String, String)>,
    pub dropped_columns: Vec<String>,
}

impl TableLayout {
    /// One entity per country; provinces are summed later.
    pub fn countries() -> Self {
        let mut dropped: Vec<String> = METADATA_COLUMNS.iter().map(|s| s.to_string()).collect();
        dropped.push(PROVINCE_COLUMN.to_string());
        Self {
            entity_column: COUNTRY_COLUMN.to_string(),
            parent: None,
            dropped_columns: dropped,
        }
    }

    /// One entity per province/state of `country`.
    pub fn regions_of(country: &str) -> Self {
        Self {
            entity_column: PROVINCE_COLUMN.to_string(),
            parent: Some((COUNTRY_COLUMN.to_string(), country.to_string())),
            dropped_columns: METADATA_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn is_dropped(&self, column: &str) -> bool {
        column == self.entity_column
            || self.parent.as_ref().map(|(c, _)| c == column).unwrap_or(false)
            || self.dropped_columns.iter().any(|c| c == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub entity: String,
    pub counts: Vec<u64>,
}

/// Date labels are kept verbatim; parsing happens during normalization.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub date_labels: Vec<String>,
    pub rows: Vec<RawRow>,
    /// SHA-256 of the payload the table was decoded from
    pub digest: String,
    /// Rows dropped because the entity cell was blank
    pub skipped_rows: u64,
}

impl RawTable {
    /// Decode a CSV payload, or an xlsx workbook when the bytes carry the
    /// zip signature.
    pub fn decode(bytes: &[u8], layout: &TableLayout) -> FetchResult<Self> {
        if workbook::is_workbook(bytes) {
            Self::from_xlsx_bytes(bytes, layout)
        } else {
            Self::from_csv_bytes(bytes, layout)
        }
    }

    pub fn from_csv_bytes(bytes: &[u8], layout: &TableLayout) -> FetchResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(bytes);

        let header: Vec<String> = reader
            .headers()
            .map_err(|e| FetchError::Malformed(format!("header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();
        let records = reader.into_records().enumerate().map(|(line, record)| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<String>>())
                .map_err(|e| FetchError::Malformed(format!("row {}: {}", line + 1, e)))
        });
        Self::from_records(&header, records, layout, sha256_hex(bytes))
    }

    /// Decode the first worksheet of an xlsx workbook laid out like the CSV
    /// time series: a header row, then one row per region.
    pub fn from_xlsx_bytes(bytes: &[u8], layout: &TableLayout) -> FetchResult<Self> {
        let mut rows = workbook::first_sheet_rows(bytes)?.into_iter();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| FetchError::Malformed("workbook sheet is empty".to_string()))?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        Self::from_records(&header, rows.map(Ok), layout, sha256_hex(bytes))
    }

    fn from_records<I>(
        header: &[String],
        records: I,
        layout: &TableLayout,
        digest: String,
    ) -> FetchResult<Self>
    where
        I: Iterator<Item = FetchResult<Vec<String>>>,
    {
        let entity_idx = header
            .iter()
            .position(|h| *h == layout.entity_column)
            .ok_or_else(|| FetchError::Malformed(format!("missing column '{}'", layout.entity_column)))?;

        let parent_idx = match &layout.parent {
            Some((column, value)) => {
                let idx = header
                    .iter()
                    .position(|h| h == column)
                    .ok_or_else(|| FetchError::Malformed(format!("missing column '{}'", column)))?;
                Some((idx, value.as_str()))
            }
            None => None,
        };

        let date_cols: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty() && !layout.is_dropped(h))
            .map(|(i, h)| (i, h.clone()))
            .collect();
        if date_cols.is_empty() {
            return Err(FetchError::Malformed("no date columns".to_string()));
        }

        let mut rows = Vec::new();
        let mut skipped_rows = 0u64;
        for (line, record) in records.enumerate() {
            let record = record?;
            let cell = |idx: usize| record.get(idx).map(String::as_str).unwrap_or("");
            if let Some((idx, wanted)) = parent_idx {
                if cell(idx).trim() != wanted {
                    continue;
                }
            }
            let entity = cell(entity_idx).trim();
            if entity.is_empty() {
                skipped_rows += 1;
                continue;
            }
            let mut counts = Vec::with_capacity(date_cols.len());
            for (idx, label) in &date_cols {
                let raw = cell(*idx);
                let count = parse_count(raw).ok_or_else(|| {
                    FetchError::Malformed(format!(
                        "row {} ({}) column {}: bad count '{}'",
                        line + 1,
                        entity,
                        label,
                        raw
                    ))
                })?;
                counts.push(count);
            }
            rows.push(RawRow {
                entity: entity.to_string(),
                counts,
            });
        }

        Ok(Self {
            date_labels: date_cols.into_iter().map(|(_, h)| h).collect(),
            rows,
            digest,
            skipped_rows,
        })
    }
}

/// Blank cells count as zero; float-formatted integers are accepted.
fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(0);
    }
    if let Ok(v) = cell.parse::<u64>() {
        return Some(v);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Some(v as u64),
        _ => None,
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
