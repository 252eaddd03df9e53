//! Case-count dashboard core: fetch public time series, reshape them into
//! per-entity daily series, and describe charts for a UI to render.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod series;
pub mod server;
pub mod snapshot;
pub mod source;
