//! Query layer for a UI: a full selection in, a chart description out.
//!
//! Every call recomputes from the snapshot it is given; nothing is cached
//! between interactions.

use serde::{Deserialize, Serialize};

use crate::chart::{assemble, Category, ChartOptions, ChartSpec, Scale};
use crate::config::{split_list, Config};
use crate::error::DashboardError;
use crate::logging::{info, obj, v_num, v_str, Domain};
use crate::series::{SeriesEngine, ViewKind};
use crate::snapshot::Snapshot;

/// Which chart a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Total,
    New,
    NewVsTotal,
    Regions,
}

impl ChartKind {
    pub fn view(&self) -> ViewKind {
        match self {
            ChartKind::Total | ChartKind::Regions => ViewKind::Total,
            ChartKind::New => ViewKind::New,
            ChartKind::NewVsTotal => ViewKind::NewVsTotal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Total => "total",
            ChartKind::New => "new",
            ChartKind::NewVsTotal => "new_vs_total",
            ChartKind::Regions => "regions",
        }
    }

    pub const ALL: [ChartKind; 4] = [
        ChartKind::Total,
        ChartKind::New,
        ChartKind::NewVsTotal,
        ChartKind::Regions,
    ];
}

/// Current UI state for one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub category: Category,
    pub scale: Scale,
    pub window: usize,
    /// Empty means "the configured default set" (all regions for the region chart)
    pub entities: Vec<String>,
    pub emphasis: Vec<String>,
}

impl Selection {
    pub fn default_for(kind: ChartKind, cfg: &Config) -> Self {
        let scale = match kind {
            ChartKind::New => Scale::Linear,
            _ => Scale::Log,
        };
        Self {
            category: Category::Confirmed,
            scale,
            window: cfg.default_window,
            entities: Vec::new(),
            emphasis: cfg.emphasis.clone(),
        }
    }

    /// Apply `key=value` overrides on top of the defaults for `kind`.
    pub fn from_query<I, K, V>(kind: ChartKind, cfg: &Config, pairs: I) -> Result<Self, DashboardError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut sel = Self::default_for(kind, cfg);
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "category" => sel.category = value.parse().map_err(DashboardError::BadRequest)?,
                "scale" => sel.scale = value.parse().map_err(DashboardError::BadRequest)?,
                "window" => {
                    sel.window = value
                        .trim()
                        .parse()
                        .map_err(|_| DashboardError::BadRequest(format!("bad window '{}'", value)))?
                }
                "entities" => sel.entities = split_list(value),
                "emphasis" => sel.emphasis = split_list(value),
                _ => {}
            }
        }
        Ok(sel)
    }
}

pub struct Dashboard {
    engine: SeriesEngine,
    countries: Vec<String>,
    regions_country: String,
    width: u32,
    height: u32,
}

impl Dashboard {
    pub fn new(cfg: &Config) -> Self {
        Self {
            engine: SeriesEngine::from_config(cfg),
            countries: cfg.countries.clone(),
            regions_country: cfg.regions_country.clone(),
            width: cfg.chart_width,
            height: cfg.chart_height,
        }
    }

    pub fn chart(
        &self,
        kind: ChartKind,
        snapshot: &Snapshot,
        sel: &Selection,
    ) -> Result<ChartSpec, DashboardError> {
        let spec = match kind {
            ChartKind::Regions => self.region_chart(snapshot, sel)?,
            _ => {
                let entities = if sel.entities.is_empty() {
                    &self.countries
                } else {
                    &sel.entities
                };
                let derived = self.engine.derive(
                    kind.view(),
                    snapshot.series(sel.category),
                    entities,
                    sel.window,
                )?;
                assemble(&derived, &self.options(sel))
            }
        };
        info(
            Domain::Chart,
            "assembled",
            obj(&[
                ("chart", v_str(kind.as_str())),
                ("category", v_str(sel.category.descr())),
                ("window", v_num(sel.window as f64)),
                ("lines", v_num(spec.lines.len() as f64)),
            ]),
        );
        Ok(spec)
    }

    pub fn total_chart(&self, snapshot: &Snapshot, sel: &Selection) -> Result<ChartSpec, DashboardError> {
        self.chart(ChartKind::Total, snapshot, sel)
    }

    pub fn new_chart(&self, snapshot: &Snapshot, sel: &Selection) -> Result<ChartSpec, DashboardError> {
        self.chart(ChartKind::New, snapshot, sel)
    }

    pub fn new_vs_total_chart(&self, snapshot: &Snapshot, sel: &Selection) -> Result<ChartSpec, DashboardError> {
        self.chart(ChartKind::NewVsTotal, snapshot, sel)
    }

    /// Cumulative counts per province/state of the breakdown country.
    pub fn region_chart(&self, snapshot: &Snapshot, sel: &Selection) -> Result<ChartSpec, DashboardError> {
        let regions = snapshot
            .regions
            .as_ref()
            .ok_or_else(|| DashboardError::RegionsUnavailable(self.regions_country.clone()))?;
        let entities: Vec<String> = if sel.entities.is_empty() {
            regions.series.names().map(str::to_string).collect()
        } else {
            sel.entities.clone()
        };
        let derived = self.engine.total(&regions.series, &entities);
        let opts = self.options(sel).with_title(format!(
            "Covid-19 {} in {} by region",
            sel.category.descr(),
            regions.country
        ));
        Ok(assemble(&derived, &opts))
    }

    fn options(&self, sel: &Selection) -> ChartOptions {
        ChartOptions::new(sel.category, sel.scale)
            .with_emphasis(&sel.emphasis)
            .with_size(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_chart() {
        let cfg = Config::default();
        assert_eq!(Selection::default_for(ChartKind::Total, &cfg).scale, Scale::Log);
        assert_eq!(Selection::default_for(ChartKind::New, &cfg).scale, Scale::Linear);
        assert_eq!(Selection::default_for(ChartKind::NewVsTotal, &cfg).window, 7);
    }

    #[test]
    fn query_overrides() {
        let cfg = Config::default();
        let sel = Selection::from_query(
            ChartKind::New,
            &cfg,
            vec![
                ("category", "deaths"),
                ("window", "3"),
                ("entities", "Korea, South;Italy"),
                ("unused", "x"),
            ],
        )
        .unwrap();
        assert_eq!(sel.category, Category::Deaths);
        assert_eq!(sel.window, 3);
        assert_eq!(sel.entities, vec!["Korea, South", "Italy"]);
        assert_eq!(sel.emphasis, vec!["Sweden"]);
    }

    #[test]
    fn bad_query_values() {
        let cfg = Config::default();
        assert!(Selection::from_query(ChartKind::Total, &cfg, vec![("scale", "cubic")]).is_err());
        assert!(Selection::from_query(ChartKind::Total, &cfg, vec![("window", "seven")]).is_err());
    }
}
