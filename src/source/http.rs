use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::data::RawTable;
use crate::error::{FetchError, FetchResult};
use crate::source::{decode, SourceId, TableSource};

pub struct HttpSource {
    client: Client,
    confirmed_url: String,
    deaths_url: String,
    regions_url: String,
}

impl HttpSource {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(cfg.http_timeout_secs))
                .build()?,
            confirmed_url: cfg.confirmed_url.clone(),
            deaths_url: cfg.deaths_url.clone(),
            regions_url: cfg.regions_url.clone(),
        })
    }
}

#[async_trait]
impl TableSource for HttpSource {
    async fn fetch(&self, id: &SourceId) -> FetchResult<RawTable> {
        let url = self.location(id);
        let http_err = |e: reqwest::Error| FetchError::Http {
            url: url.clone(),
            reason: e.to_string(),
        };

        let resp = self.client.get(&url).send().await.map_err(http_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await.map_err(http_err)?;
        decode(id, &url, &bytes)
    }

    fn location(&self, id: &SourceId) -> String {
        match id {
            SourceId::Confirmed => self.confirmed_url.clone(),
            SourceId::Deaths => self.deaths_url.clone(),
            SourceId::Regions { .. } => self.regions_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    const CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20
Hubei,China,30.9,112.2,444,549
,Sweden,60.1,18.6,0,1
";

    fn answer(mut stream: TcpStream) -> std::io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
                break;
            }
        }
        let target = request_line.split_whitespace().nth(1).unwrap_or("/");
        let (status, body) = match target {
            "/confirmed.csv" => ("200 OK", CONFIRMED),
            "/deaths.csv" => ("200 OK", "hello\nworld\n"),
            _ => ("404 NOT FOUND", "missing"),
        };
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(resp.as_bytes())
    }

    fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = answer(stream);
            }
        });
        format!("http://{}", addr)
    }

    fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/regions.csv", addr)
    }

    fn source(base: &str, regions_url: String) -> HttpSource {
        let cfg = Config {
            confirmed_url: format!("{}/confirmed.csv", base),
            deaths_url: format!("{}/deaths.csv", base),
            regions_url,
            http_timeout_secs: 5,
            ..Config::default()
        };
        HttpSource::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn decodes_successful_download() {
        let base = serve();
        let src = source(&base, closed_port());
        let table = src.fetch(&SourceId::Confirmed).await.unwrap();
        assert_eq!(table.date_labels, vec!["1/22/20", "1/23/20"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].counts, vec![444, 549]);
    }

    #[tokio::test]
    async fn error_kinds_follow_the_failure() {
        let base = serve();

        let src = source(&base, format!("{}/gone.csv", base));
        let regions = SourceId::Regions {
            country: "China".to_string(),
        };
        match src.fetch(&regions).await {
            Err(FetchError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/gone.csv"));
            }
            other => panic!("expected status error, got {:?}", other.map(|t| t.rows.len())),
        }

        let err = src.fetch(&SourceId::Deaths).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));

        let src = source(&base, closed_port());
        let err = src.fetch(&regions).await.unwrap_err();
        assert!(matches!(err, FetchError::Http { .. }));
    }
}
