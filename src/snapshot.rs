//! An immutable, fully normalized copy of every dataset the dashboard reads.
//!
//! A refresh builds a new `Snapshot`; readers holding the old one keep a
//! consistent view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::chart::Category;
use crate::config::Config;
use crate::data::normalize::{normalize, EntitySeries};
use crate::data::RawTable;
use crate::error::DashboardError;
use crate::logging::{error, info, obj, v_num, v_str, warn, Domain};
use crate::source::{SourceId, TableSource};

#[derive(Debug, Clone)]
pub struct RegionBreakdown {
    pub country: String,
    pub series: EntitySeries,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub confirmed: EntitySeries,
    pub deaths: EntitySeries,
    pub regions: Option<RegionBreakdown>,
    /// source name -> sha256 of the fetched payload
    pub digests: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub fetched_at: String,
    pub confirmed_entities: usize,
    pub deaths_entities: usize,
    pub dates: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub deaths_dates: usize,
    pub deaths_last_date: Option<String>,
    /// false when the confirmed and deaths tables cover different dates
    pub date_axes_match: bool,
    pub regions_country: Option<String>,
    pub region_entities: usize,
    pub digests: BTreeMap<String, String>,
}

impl Snapshot {
    /// Fetch and normalize everything. Confirmed and deaths are required; a
    /// failed region fetch leaves `regions` empty.
    pub async fn load(
        source: &(dyn TableSource + Send + Sync),
        cfg: &Config,
    ) -> Result<Snapshot, DashboardError> {
        let confirmed = fetch_logged(source, &SourceId::Confirmed).await?;
        let deaths = fetch_logged(source, &SourceId::Deaths).await?;
        let region_id = SourceId::Regions {
            country: cfg.regions_country.clone(),
        };
        let regions = match fetch_logged(source, &region_id).await {
            Ok(table) => Some(table),
            Err(e) => {
                warn(
                    Domain::System,
                    "regions_unavailable",
                    obj(&[
                        ("country", v_str(&cfg.regions_country)),
                        ("msg", v_str(&e.to_string())),
                    ]),
                );
                None
            }
        };

        let snapshot = Self::from_tables(
            &confirmed,
            &deaths,
            regions.as_ref().map(|t| (cfg.regions_country.as_str(), t)),
        )?;
        info(
            Domain::System,
            "snapshot_loaded",
            obj(&[
                ("confirmed_entities", v_num(snapshot.confirmed.entity_count() as f64)),
                ("deaths_entities", v_num(snapshot.deaths.entity_count() as f64)),
                ("dates", v_num(snapshot.confirmed.date_count() as f64)),
            ]),
        );
        Ok(snapshot)
    }

    /// Normalize fetched tables. A region table that fails to normalize is
    /// dropped with a warning; confirmed and deaths failures are returned.
    pub fn from_tables(
        confirmed: &RawTable,
        deaths: &RawTable,
        regions: Option<(&str, &RawTable)>,
    ) -> Result<Snapshot, DashboardError> {
        let mut digests = BTreeMap::new();
        digests.insert("confirmed".to_string(), confirmed.digest.clone());
        digests.insert("deaths".to_string(), deaths.digest.clone());

        let confirmed = normalize(confirmed)?;
        let deaths = normalize(deaths)?;
        if confirmed.dates() != deaths.dates() {
            warn(
                Domain::Normalize,
                "date_axis_mismatch",
                obj(&[
                    ("confirmed_dates", v_num(confirmed.date_count() as f64)),
                    ("deaths_dates", v_num(deaths.date_count() as f64)),
                    ("confirmed_last", v_str(&last_date(&confirmed).unwrap_or_default())),
                    ("deaths_last", v_str(&last_date(&deaths).unwrap_or_default())),
                ]),
            );
        }

        let regions = match regions {
            Some((country, table)) => match normalize(table) {
                Ok(series) => {
                    digests.insert("regions".to_string(), table.digest.clone());
                    Some(RegionBreakdown {
                        country: country.to_string(),
                        series,
                    })
                }
                Err(e) => {
                    warn(
                        Domain::Normalize,
                        "regions_unavailable",
                        obj(&[("country", v_str(country)), ("msg", v_str(&e.to_string()))]),
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Snapshot {
            fetched_at: Utc::now(),
            confirmed,
            deaths,
            regions,
            digests,
        })
    }

    pub fn series(&self, category: Category) -> &EntitySeries {
        match category {
            Category::Confirmed => &self.confirmed,
            Category::Deaths => &self.deaths,
        }
    }

    pub fn summary(&self) -> SnapshotSummary {
        let dates = self.confirmed.dates();
        SnapshotSummary {
            fetched_at: self.fetched_at.to_rfc3339(),
            confirmed_entities: self.confirmed.entity_count(),
            deaths_entities: self.deaths.entity_count(),
            dates: dates.len(),
            first_date: dates.first().map(|d| d.to_string()),
            last_date: dates.last().map(|d| d.to_string()),
            deaths_dates: self.deaths.date_count(),
            deaths_last_date: last_date(&self.deaths),
            date_axes_match: self.confirmed.dates() == self.deaths.dates(),
            regions_country: self.regions.as_ref().map(|r| r.country.clone()),
            region_entities: self.regions.as_ref().map(|r| r.series.entity_count()).unwrap_or(0),
            digests: self.digests.clone(),
        }
    }
}

fn last_date(series: &EntitySeries) -> Option<String> {
    series.dates().last().map(|d| d.to_string())
}

async fn fetch_logged(
    source: &(dyn TableSource + Send + Sync),
    id: &SourceId,
) -> Result<RawTable, DashboardError> {
    info(
        Domain::Fetch,
        "fetch_start",
        obj(&[("source", v_str(id.as_str())), ("location", v_str(&source.location(id)))]),
    );
    source.fetch(id).await.map_err(|e| {
        error(
            Domain::Fetch,
            "fetch_failed",
            obj(&[("source", v_str(id.as_str())), ("msg", v_str(&e.to_string()))]),
        );
        DashboardError::from(e)
    })
}
