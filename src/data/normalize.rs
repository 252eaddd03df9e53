//! Collapse raw regional rows into one cumulative series per entity.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::data::dates::parse_dates;
use crate::data::RawTable;
use crate::error::{SeriesError, SeriesResult};
use crate::logging::{info, obj, v_num, v_str, warn, Domain};

/// Entity name to cumulative counts, all entities sharing one date axis.
///
/// Built once per fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntitySeries {
    dates: Vec<NaiveDate>,
    values: BTreeMap<String, Vec<u64>>,
}

impl EntitySeries {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn date_count(&self) -> usize {
        self.dates.len()
    }

    /// True when no entity has any row.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.values.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.values.contains_key(entity)
    }

    pub fn get(&self, entity: &str) -> Option<&[u64]> {
        self.values.get(entity).map(Vec::as_slice)
    }

    pub fn require(&self, entity: &str) -> SeriesResult<&[u64]> {
        self.get(entity)
            .ok_or_else(|| SeriesError::UnknownEntity(entity.to_string()))
    }

    /// (date, cumulative count) pairs for one entity.
    pub fn points<'a>(&'a self, entity: &str) -> Option<impl Iterator<Item = (NaiveDate, u64)> + 'a> {
        self.values
            .get(entity)
            .map(|v| self.dates.iter().copied().zip(v.iter().copied()))
    }

    /// Entities whose cumulative count drops at least once (upstream corrections).
    pub fn non_monotonic_entities(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(_, v)| v.windows(2).any(|w| w[1] < w[0]))
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Sum rows sharing an entity name column-wise and parse the date axis.
pub fn normalize(raw: &RawTable) -> SeriesResult<EntitySeries> {
    let dates = parse_dates(&raw.date_labels)?;

    let mut values: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for row in &raw.rows {
        match values.get_mut(&row.entity) {
            Some(acc) => {
                for (a, c) in acc.iter_mut().zip(&row.counts) {
                    *a = a.saturating_add(*c);
                }
            }
            None => {
                values.insert(row.entity.clone(), row.counts.clone());
            }
        }
    }

    let series = EntitySeries { dates, values };

    let corrected = series.non_monotonic_entities();
    if !corrected.is_empty() {
        warn(
            Domain::Normalize,
            "non_monotonic",
            obj(&[
                ("msg", v_str("cumulative counts decrease; keeping as reported")),
                ("count", v_num(corrected.len() as f64)),
                ("entities", v_str(&corrected.join("|"))),
            ]),
        );
    }
    info(
        Domain::Normalize,
        "normalized",
        obj(&[
            ("raw_rows", v_num(raw.rows.len() as f64)),
            ("entities", v_num(series.entity_count() as f64)),
            ("dates", v_num(series.date_count() as f64)),
        ]),
    );

    Ok(series)
}
