//! Derived views over an `EntitySeries`: cumulative totals, smoothed daily new
//! counts, and smoothed new-versus-total pairs.
//!
//! All queries are pure. Entities come back in the order they were requested;
//! names missing from the source yield an empty entry and are listed in
//! `DerivedSeries::unknown`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::normalize::EntitySeries;
use crate::error::{SeriesError, SeriesResult};
use crate::indicators::{first_difference, rolling_mean};
use crate::logging::{obj, v_num, v_str, warn, Domain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Total,
    New,
    NewVsTotal,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Total => "total",
            ViewKind::New => "new",
            ViewKind::NewVsTotal => "new_vs_total",
        }
    }
}

/// Values index-aligned with `DerivedEntry::dates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedValues {
    Total { cumulative: Vec<u64> },
    New { new: Vec<f64> },
    NewVsTotal { total: Vec<f64>, new: Vec<f64> },
}

impl DerivedValues {
    fn empty(view: ViewKind) -> Self {
        match view {
            ViewKind::Total => DerivedValues::Total { cumulative: Vec::new() },
            ViewKind::New => DerivedValues::New { new: Vec::new() },
            ViewKind::NewVsTotal => DerivedValues::NewVsTotal {
                total: Vec::new(),
                new: Vec::new(),
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DerivedValues::Total { cumulative } => cumulative.len(),
            DerivedValues::New { new } => new.len(),
            DerivedValues::NewVsTotal { new, .. } => new.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedEntry {
    pub entity: String,
    pub dates: Vec<NaiveDate>,
    pub values: DerivedValues,
}

impl DerivedEntry {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub view: ViewKind,
    pub window: usize,
    pub entries: Vec<DerivedEntry>,
    pub unknown: Vec<String>,
}

impl DerivedSeries {
    pub fn entry(&self, entity: &str) -> Option<&DerivedEntry> {
        self.entries.iter().find(|e| e.entity == entity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesEngine {
    /// Leading dates dropped before differencing in the new-count views
    pub skip_leading: usize,
    pub max_window: usize,
}

impl SeriesEngine {
    pub fn new(skip_leading: usize, max_window: usize) -> Self {
        Self {
            skip_leading,
            max_window: max_window.max(1),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.new_skip_days, cfg.max_window)
    }

    pub fn check_window(&self, window: usize) -> SeriesResult<()> {
        if window == 0 || window > self.max_window {
            return Err(SeriesError::InvalidWindow {
                window,
                max: self.max_window,
            });
        }
        Ok(())
    }

    /// Cumulative counts as stored.
    pub fn total<S: AsRef<str>>(&self, series: &EntitySeries, entities: &[S]) -> DerivedSeries {
        build(ViewKind::Total, 1, series, entities, |dates, cum| {
            (
                dates.to_vec(),
                DerivedValues::Total {
                    cumulative: cum.to_vec(),
                },
            )
        })
    }

    /// Day-over-day increase, smoothed with a trailing mean of `window` days.
    pub fn new_counts<S: AsRef<str>>(
        &self,
        series: &EntitySeries,
        entities: &[S],
        window: usize,
    ) -> SeriesResult<DerivedSeries> {
        self.check_window(window)?;
        let skip = self.skip_leading;
        Ok(build(ViewKind::New, window, series, entities, |dates, cum| {
            let (dates, cum) = tail(dates, cum, skip);
            let new = rolling_mean(&first_difference(cum), window);
            (dates.iter().skip(1).copied().collect(), DerivedValues::New { new })
        }))
    }

    /// Smoothed totals paired with smoothed new counts on the same dates.
    pub fn new_vs_total<S: AsRef<str>>(
        &self,
        series: &EntitySeries,
        entities: &[S],
        window: usize,
    ) -> SeriesResult<DerivedSeries> {
        self.check_window(window)?;
        let skip = self.skip_leading;
        Ok(build(ViewKind::NewVsTotal, window, series, entities, |dates, cum| {
            let (dates, cum) = tail(dates, cum, skip);
            let as_f64: Vec<f64> = cum.iter().map(|v| *v as f64).collect();
            // The first date has no difference; drop its total so both stay aligned.
            let total: Vec<f64> = rolling_mean(&as_f64, window).into_iter().skip(1).collect();
            let new = rolling_mean(&first_difference(cum), window);
            (
                dates.iter().skip(1).copied().collect(),
                DerivedValues::NewVsTotal { total, new },
            )
        }))
    }

    pub fn derive<S: AsRef<str>>(
        &self,
        view: ViewKind,
        series: &EntitySeries,
        entities: &[S],
        window: usize,
    ) -> SeriesResult<DerivedSeries> {
        match view {
            ViewKind::Total => Ok(self.total(series, entities)),
            ViewKind::New => self.new_counts(series, entities, window),
            ViewKind::NewVsTotal => self.new_vs_total(series, entities, window),
        }
    }
}

fn tail<'a>(dates: &'a [NaiveDate], cum: &'a [u64], skip: usize) -> (&'a [NaiveDate], &'a [u64]) {
    let start = skip.min(cum.len()).min(dates.len());
    (&dates[start..], &cum[start..])
}

fn build<S, F>(
    view: ViewKind,
    window: usize,
    series: &EntitySeries,
    entities: &[S],
    derive: F,
) -> DerivedSeries
where
    S: AsRef<str>,
    F: Fn(&[NaiveDate], &[u64]) -> (Vec<NaiveDate>, DerivedValues),
{
    let mut entries = Vec::with_capacity(entities.len());
    let mut unknown = Vec::new();
    for name in entities {
        let name = name.as_ref();
        match series.require(name) {
            Ok(cum) => {
                let (dates, values) = derive(series.dates(), cum);
                entries.push(DerivedEntry {
                    entity: name.to_string(),
                    dates,
                    values,
                });
            }
            Err(_) => {
                unknown.push(name.to_string());
                entries.push(DerivedEntry {
                    entity: name.to_string(),
                    dates: Vec::new(),
                    values: DerivedValues::empty(view),
                });
            }
        }
    }
    if !unknown.is_empty() {
        warn(
            Domain::Series,
            "unknown_entities",
            obj(&[
                ("view", v_str(view.as_str())),
                ("count", v_num(unknown.len() as f64)),
                ("entities", v_str(&unknown.join("|"))),
            ]),
        );
    }
    DerivedSeries {
        view,
        window,
        entries,
        unknown,
    }
}
