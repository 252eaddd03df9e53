use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use covidboard::config::Config;
use covidboard::dashboard::{ChartKind, Dashboard, Selection};
use covidboard::logging::{info, obj, v_num, v_str, warn, Domain};
use covidboard::snapshot::Snapshot;
use covidboard::source::SourceKind;

/// Fetch once and write every chart for the default selection as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate()?;
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| cfg.out_dir.clone()));

    let source = SourceKind::from_config(&cfg).build(&cfg)?;
    let snapshot = Snapshot::load(source.as_ref(), &cfg).await?;
    let dashboard = Dashboard::new(&cfg);

    fs::create_dir_all(&out_dir)?;
    let mut written = 0usize;
    for kind in ChartKind::ALL {
        let sel = Selection::default_for(kind, &cfg);
        let spec = match dashboard.chart(kind, &snapshot, &sel) {
            Ok(spec) => spec,
            Err(e) => {
                warn(
                    Domain::System,
                    "chart_skipped",
                    obj(&[("chart", v_str(kind.as_str())), ("msg", v_str(&e.to_string()))]),
                );
                continue;
            }
        };
        let path = out_dir.join(format!("{}.json", kind.as_str()));
        fs::write(&path, serde_json::to_string_pretty(&spec)?)?;
        written += 1;
    }
    fs::write(
        out_dir.join("summary.json"),
        serde_json::to_string_pretty(&snapshot.summary())?,
    )?;

    info(
        Domain::System,
        "charts_written",
        obj(&[
            ("out_dir", v_str(&out_dir.display().to_string())),
            ("charts", v_num(written as f64)),
        ]),
    );
    Ok(())
}
