use anyhow::{anyhow, Result};

pub const JHU_BASE: &str =
    "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";
pub const CONFIRMED_FILE: &str = "time_series_covid19_confirmed_global.csv";
pub const DEATHS_FILE: &str = "time_series_covid19_deaths_global.csv";

pub const DEFAULT_COUNTRIES: [&str; 13] = [
    "China",
    "Denmark",
    "Finland",
    "France",
    "Germany",
    "Italy",
    "Korea, South",
    "Norway",
    "Singapore",
    "Spain",
    "Sweden",
    "Switzerland",
    "US",
];

#[derive(Clone, Debug)]
pub struct Config {
    /// "http" or "file"
    pub source: String,
    pub confirmed_url: String,
    pub deaths_url: String,
    pub regions_url: String,
    pub regions_country: String,
    pub data_dir: String,
    pub confirmed_file: String,
    pub deaths_file: String,
    pub regions_file: String,
    pub countries: Vec<String>,
    pub emphasis: Vec<String>,
    pub default_window: usize,
    pub max_window: usize,
    /// Leading dates dropped before differencing in the new-count views
    pub new_skip_days: usize,
    pub http_timeout_secs: u64,
    pub bind_addr: String,
    pub out_dir: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        let mut countries: Vec<String> = DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect();
        countries.sort();
        Self {
            source: "http".to_string(),
            confirmed_url: format!("{}/{}", JHU_BASE, CONFIRMED_FILE),
            deaths_url: format!("{}/{}", JHU_BASE, DEATHS_FILE),
            regions_url: format!("{}/{}", JHU_BASE, CONFIRMED_FILE),
            regions_country: "China".to_string(),
            data_dir: "COVID-19/csse_covid_19_data/csse_covid_19_time_series".to_string(),
            confirmed_file: CONFIRMED_FILE.to_string(),
            deaths_file: DEATHS_FILE.to_string(),
            regions_file: CONFIRMED_FILE.to_string(),
            countries,
            emphasis: vec!["Sweden".to_string()],
            default_window: 7,
            max_window: 14,
            new_skip_days: 39,
            http_timeout_secs: 30,
            bind_addr: "0.0.0.0:8050".to_string(),
            out_dir: "out/charts".to_string(),
            chart_width: 800,
            chart_height: 600,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        let regions_url = std::env::var("REGIONS_URL")
            .or_else(|_| std::env::var("CONFIRMED_URL"))
            .unwrap_or(d.regions_url);
        let mut countries = std::env::var("COUNTRIES").ok().map(|v| split_list(&v)).unwrap_or(d.countries);
        countries.sort();
        Self {
            source: std::env::var("SOURCE").unwrap_or(d.source),
            confirmed_url: std::env::var("CONFIRMED_URL").unwrap_or(d.confirmed_url),
            deaths_url: std::env::var("DEATHS_URL").unwrap_or(d.deaths_url),
            regions_url,
            regions_country: std::env::var("REGIONS_COUNTRY").unwrap_or(d.regions_country),
            data_dir: std::env::var("DATA_DIR").unwrap_or(d.data_dir),
            confirmed_file: std::env::var("CONFIRMED_FILE").unwrap_or(d.confirmed_file),
            deaths_file: std::env::var("DEATHS_FILE").unwrap_or(d.deaths_file),
            regions_file: std::env::var("REGIONS_FILE").unwrap_or(d.regions_file),
            countries,
            emphasis: std::env::var("EMPHASIS").ok().map(|v| split_list(&v)).unwrap_or(d.emphasis),
            default_window: std::env::var("DEFAULT_WINDOW").ok().and_then(|v| v.parse().ok()).unwrap_or(d.default_window),
            max_window: std::env::var("MAX_WINDOW").ok().and_then(|v| v.parse().ok()).unwrap_or(d.max_window),
            new_skip_days: std::env::var("NEW_SKIP_DAYS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.new_skip_days),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.http_timeout_secs),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(d.bind_addr),
            out_dir: std::env::var("OUT_DIR").unwrap_or(d.out_dir),
            chart_width: std::env::var("CHART_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.chart_width),
            chart_height: std::env::var("CHART_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.chart_height),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_window == 0 {
            return Err(anyhow!("MAX_WINDOW must be at least 1"));
        }
        if self.default_window == 0 || self.default_window > self.max_window {
            return Err(anyhow!(
                "DEFAULT_WINDOW {} outside 1..={}",
                self.default_window,
                self.max_window
            ));
        }
        if !matches!(self.source.as_str(), "http" | "file") {
            return Err(anyhow!("SOURCE must be 'http' or 'file', got '{}'", self.source));
        }
        Ok(())
    }
}

/// Comma separated list, trimmed, empties dropped.
///
/// Entity names like "Korea, South" contain commas, so `;` is accepted as an
/// alternative separator when present.
pub fn split_list(raw: &str) -> Vec<String> {
    let sep = if raw.contains(';') { ';' } else { ',' };
    raw.split(sep)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
