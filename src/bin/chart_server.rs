//! Chart server
//!
//! Serves chart descriptions as JSON for a browser front end.
//! Run with: cargo run --bin chart_server

use anyhow::Result;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use covidboard::config::Config;
use covidboard::dashboard::Dashboard;
use covidboard::logging::{error, info, obj, v_str, Domain};
use covidboard::server::{parse_request_line, render_http, respond, Response, Route};
use covidboard::snapshot::Snapshot;
use covidboard::source::SourceKind;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate()?;
    let rt = tokio::runtime::Runtime::new()?;
    let source = SourceKind::from_config(&cfg).build(&cfg)?;
    let mut snapshot = rt.block_on(Snapshot::load(source.as_ref(), &cfg))?;
    let dashboard = Dashboard::new(&cfg);

    let listener = TcpListener::bind(&cfg.bind_addr)?;
    info(
        Domain::Server,
        "listening",
        obj(&[("addr", v_str(&cfg.bind_addr))]),
    );
    println!("Endpoints:");
    println!("  GET /api/health        - Snapshot summary");
    println!("  GET /api/total         - Cumulative counts vs date");
    println!("  GET /api/new           - Smoothed new counts vs date");
    println!("  GET /api/new_vs_total  - Smoothed new vs total");
    println!("  GET /api/regions       - Cumulative counts by region");
    println!("  GET /api/refresh       - Re-fetch all sources");
    println!("Query: category, scale, window, entities, emphasis");

    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(s) => s,
            Err(_) => continue,
        };

        let request = match BufReader::new(&stream).lines().next() {
            Some(Ok(line)) => line,
            _ => continue,
        };
        let target = request.split_whitespace().nth(1).unwrap_or("/");

        let resp = match parse_request_line(&request) {
            Err(rejected) => rejected,
            Ok((Route::Refresh, _)) => match rt.block_on(Snapshot::load(source.as_ref(), &cfg)) {
                Ok(fresh) => {
                    snapshot = fresh;
                    respond(&Route::Health, &[], &dashboard, &snapshot, &cfg)
                }
                Err(e) => {
                    // keep serving the previous snapshot
                    error(
                        Domain::Server,
                        "refresh_failed",
                        obj(&[("msg", v_str(&e.to_string()))]),
                    );
                    Response::from_error(&e)
                }
            },
            Ok((route, query)) => respond(&route, &query, &dashboard, &snapshot, &cfg),
        };

        info(
            Domain::Server,
            "request",
            obj(&[("target", v_str(target)), ("status", v_str(resp.status))]),
        );
        let _ = stream.write_all(render_http(&resp).as_bytes());
    }
    Ok(())
}
