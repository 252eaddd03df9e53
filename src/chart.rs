//! Renderer-neutral chart descriptions built from derived series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::series::{DerivedSeries, DerivedValues, ViewKind};

pub const EMPHASIS_WIDTH: u32 = 4;
pub const NORMAL_WIDTH: u32 = 2;
pub const LINE_MODE: &str = "lines+markers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Linear,
    Log,
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Scale::Linear),
            "log" | "logarithmic" => Ok(Scale::Log),
            other => Err(format!("unknown scale '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Confirmed,
    Deaths,
}

impl Category {
    /// Wording used in titles and axis labels.
    pub fn descr(&self) -> &'static str {
        match self {
            Category::Confirmed => "confirmed cases",
            Category::Deaths => "deaths",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" | "confirmed cases" | "cases" => Ok(Category::Confirmed),
            "deaths" => Ok(Category::Deaths),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValues {
    Dates(Vec<NaiveDate>),
    Numbers(Vec<f64>),
}

impl AxisValues {
    pub fn len(&self) -> usize {
        match self {
            AxisValues::Dates(v) => v.len(),
            AxisValues::Numbers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub x: AxisValues,
    pub y: Vec<f64>,
    pub width: u32,
    pub mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub scale: Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub lines: Vec<LineSeries>,
    pub width: u32,
    pub height: u32,
    /// Requested entities with no data
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub category: Category,
    pub y_scale: Scale,
    pub emphasis: Vec<String>,
    pub width: u32,
    pub height: u32,
    /// Replaces the view's default title
    pub title: Option<String>,
}

impl ChartOptions {
    pub fn new(category: Category, y_scale: Scale) -> Self {
        Self {
            category,
            y_scale,
            emphasis: Vec::new(),
            width: 800,
            height: 600,
            title: None,
        }
    }

    pub fn with_emphasis(mut self, emphasis: &[String]) -> Self {
        self.emphasis = emphasis.to_vec();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

pub fn line_width(entity: &str, emphasis: &[String]) -> u32 {
    if emphasis.iter().any(|e| e == entity) {
        EMPHASIS_WIDTH
    } else {
        NORMAL_WIDTH
    }
}

/// Turn a derived view into named lines plus axis metadata.
pub fn assemble(derived: &DerivedSeries, opts: &ChartOptions) -> ChartSpec {
    let descr = opts.category.descr();
    let w = derived.window;
    let (title, x_axis, y_axis) = match derived.view {
        ViewKind::Total => (
            format!("Covid-19 {}", descr),
            Axis { title: "Date".to_string(), scale: Scale::Linear },
            Axis { title: format!("Covid-19 {}", descr), scale: opts.y_scale },
        ),
        ViewKind::New => (
            format!("Covid-19 new {} rolling mean of {} days", descr, w),
            Axis { title: "Date".to_string(), scale: Scale::Linear },
            Axis { title: format!("Covid-19 new {}", descr), scale: opts.y_scale },
        ),
        ViewKind::NewVsTotal => (
            format!("Covid-19 {} rolling mean of {} days", descr, w),
            Axis { title: format!("Total {}", descr), scale: Scale::Log },
            Axis { title: format!("New {} per day", descr), scale: opts.y_scale },
        ),
    };

    let lines = derived
        .entries
        .iter()
        .map(|entry| {
            let (x, y) = match &entry.values {
                DerivedValues::Total { cumulative } => (
                    AxisValues::Dates(entry.dates.clone()),
                    cumulative.iter().map(|v| *v as f64).collect(),
                ),
                DerivedValues::New { new } => (AxisValues::Dates(entry.dates.clone()), new.clone()),
                DerivedValues::NewVsTotal { total, new } => {
                    (AxisValues::Numbers(total.clone()), new.clone())
                }
            };
            LineSeries {
                name: entry.entity.clone(),
                x,
                y,
                width: line_width(&entry.entity, &opts.emphasis),
                mode: LINE_MODE,
            }
        })
        .collect();

    ChartSpec {
        title: opts.title.clone().unwrap_or(title),
        x_axis,
        y_axis,
        lines,
        width: opts.width,
        height: opts.height,
        unknown: derived.unknown.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ui_values() {
        assert_eq!("confirmed cases".parse::<Category>(), Ok(Category::Confirmed));
        assert_eq!("Deaths".parse::<Category>(), Ok(Category::Deaths));
        assert!("recovered".parse::<Category>().is_err());
        assert_eq!("log".parse::<Scale>(), Ok(Scale::Log));
        assert_eq!("Linear".parse::<Scale>(), Ok(Scale::Linear));
    }

    #[test]
    fn emphasis_width_tiers() {
        let emphasis = vec!["Sweden".to_string()];
        assert_eq!(line_width("Sweden", &emphasis), EMPHASIS_WIDTH);
        assert_eq!(line_width("Norway", &emphasis), NORMAL_WIDTH);
        assert_eq!(line_width("Sweden", &[]), NORMAL_WIDTH);
    }

    #[test]
    fn scale_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scale::Log).unwrap(), "\"log\"");
    }
}
