//! Where raw case tables come from.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::config::Config;
use crate::data::{RawTable, TableLayout};
use crate::error::FetchResult;
use crate::logging::{info, obj, v_num, v_str, Domain};

mod file;
mod http;

pub use file::FileSource;
pub use http::HttpSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceId {
    Confirmed,
    Deaths,
    /// Province/state breakdown of one country
    Regions { country: String },
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Confirmed => "confirmed",
            SourceId::Deaths => "deaths",
            SourceId::Regions { .. } => "regions",
        }
    }

    pub fn layout(&self) -> TableLayout {
        match self {
            SourceId::Confirmed | SourceId::Deaths => TableLayout::countries(),
            SourceId::Regions { country } => TableLayout::regions_of(country),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Http,
    File,
}

impl SourceKind {
    pub fn from_config(cfg: &Config) -> Self {
        match cfg.source.as_str() {
            "file" => SourceKind::File,
            _ => SourceKind::Http,
        }
    }

    pub fn build(self, cfg: &Config) -> Result<Box<dyn TableSource + Send + Sync>> {
        match self {
            SourceKind::Http => Ok(Box::new(HttpSource::new(cfg)?)),
            SourceKind::File => {
                let source = FileSource::new(cfg);
                if !source.dir().is_dir() {
                    return Err(anyhow!("DATA_DIR {} is not a directory", source.dir().display()));
                }
                Ok(Box::new(source))
            }
        }
    }
}

/// One attempt per call; retrying is left to the caller.
#[async_trait]
pub trait TableSource {
    async fn fetch(&self, id: &SourceId) -> FetchResult<RawTable>;

    /// URL or path the table for `id` is read from.
    fn location(&self, id: &SourceId) -> String;
}

pub(crate) fn decode(id: &SourceId, location: &str, bytes: &[u8]) -> FetchResult<RawTable> {
    let table = RawTable::decode(bytes, &id.layout())?;
    info(
        Domain::Fetch,
        "fetched",
        obj(&[
            ("source", v_str(id.as_str())),
            ("location", v_str(location)),
            ("bytes", v_num(bytes.len() as f64)),
            ("sha256", v_str(&table.digest)),
            ("rows", v_num(table.rows.len() as f64)),
            ("dates", v_num(table.date_labels.len() as f64)),
            ("skipped_rows", v_num(table.skipped_rows as f64)),
        ]),
    );
    Ok(table)
}
