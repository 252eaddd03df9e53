//! Request routing for the JSON chart endpoint.
//!
//! Transport lives in `bin/chart_server.rs`; this module maps a request target
//! such as `/api/new?category=deaths&window=7` to a status and JSON body.

use serde_json::json;
use url::Url;

use crate::config::Config;
use crate::dashboard::{ChartKind, Dashboard, Selection};
use crate::error::{DashboardError, SeriesError};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Chart(ChartKind),
    Refresh,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: &'static str,
    pub body: String,
}

impl Response {
    fn ok(body: String) -> Self {
        Self { status: "200 OK", body }
    }

    fn error(status: &'static str, msg: &str) -> Self {
        Self {
            status,
            body: json!({ "error": msg }).to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self::error("404 NOT FOUND", "not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::error("405 METHOD NOT ALLOWED", "only GET is supported")
    }

    pub fn from_error(err: &DashboardError) -> Self {
        let status = match err {
            DashboardError::BadRequest(_) => "400 BAD REQUEST",
            DashboardError::Series(SeriesError::InvalidWindow { .. }) => "400 BAD REQUEST",
            DashboardError::RegionsUnavailable(_) | DashboardError::Fetch(_) => "503 SERVICE UNAVAILABLE",
            DashboardError::Series(_) => "500 INTERNAL SERVER ERROR",
        };
        Self::error(status, &err.to_string())
    }
}

/// Parse the request line target (path plus optional query).
pub fn parse_target(target: &str) -> Option<(Route, Vec<(String, String)>)> {
    let url = Url::parse(&format!("http://localhost{}", target)).ok()?;
    let route = match url.path() {
        "/api/health" => Route::Health,
        "/api/total" => Route::Chart(ChartKind::Total),
        "/api/new" => Route::Chart(ChartKind::New),
        "/api/new_vs_total" => Route::Chart(ChartKind::NewVsTotal),
        "/api/regions" => Route::Chart(ChartKind::Regions),
        "/api/refresh" => Route::Refresh,
        _ => Route::NotFound,
    };
    let query = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    Some((route, query))
}

/// Split an HTTP request line and route it; only `GET` is served.
pub fn parse_request_line(line: &str) -> Result<(Route, Vec<(String, String)>), Response> {
    let mut parts = line.split_whitespace();
    let (method, target) = (parts.next().unwrap_or(""), parts.next().unwrap_or("/"));
    if method != "GET" {
        return Err(Response::method_not_allowed());
    }
    parse_target(target).ok_or_else(Response::not_found)
}

/// Answer every route except `Refresh`, which needs to fetch.
pub fn respond(
    route: &Route,
    query: &[(String, String)],
    dashboard: &Dashboard,
    snapshot: &Snapshot,
    cfg: &Config,
) -> Response {
    match route {
        Route::Health => Response::ok(
            json!({ "status": "ok", "snapshot": snapshot.summary() }).to_string(),
        ),
        Route::Chart(kind) => {
            let result = Selection::from_query(*kind, cfg, query.iter().map(|(k, v)| (k, v)))
                .and_then(|sel| dashboard.chart(*kind, snapshot, &sel));
            match result {
                Ok(spec) => match serde_json::to_string(&spec) {
                    Ok(body) => Response::ok(body),
                    Err(e) => Response::error("500 INTERNAL SERVER ERROR", &e.to_string()),
                },
                Err(e) => Response::from_error(&e),
            }
        }
        Route::Refresh => Response::error("500 INTERNAL SERVER ERROR", "refresh is handled by the server loop"),
        Route::NotFound => Response::not_found(),
    }
}

pub fn render_http(resp: &Response) -> String {
    format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Content-Length: {}\r\n\r\n{}",
        resp.status,
        resp.body.len(),
        resp.body
    )
}
