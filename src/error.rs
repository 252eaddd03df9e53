//! Error types for fetching, normalizing and querying case data.

use thiserror::Error;

/// Failure to obtain or decode a raw table.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, timeout, body read)
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// Server answered with a non-success status
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Local file could not be read
    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },

    /// Payload is not a usable case table
    #[error("malformed table: {0}")]
    Malformed(String),
}

/// Errors raised while reshaping or deriving series.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("malformed date token: '{0}'")]
    MalformedDate(String),

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("window {window} outside 1..={max}")]
    InvalidWindow { window: usize, max: usize },
}

/// Errors surfaced to whatever drives the dashboard queries.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    /// Region breakdown was not loaded into the current snapshot
    #[error("region breakdown for {0} is unavailable")]
    RegionsUnavailable(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
pub type SeriesResult<T> = std::result::Result<T, SeriesError>;
