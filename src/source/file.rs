use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::data::RawTable;
use crate::error::{FetchError, FetchResult};
use crate::source::{decode, SourceId, TableSource};

/// Reads tables from a local checkout of the time series directory.
pub struct FileSource {
    dir: PathBuf,
    confirmed_file: String,
    deaths_file: String,
    regions_file: String,
}

impl FileSource {
    pub fn new(cfg: &Config) -> Self {
        Self {
            dir: PathBuf::from(&cfg.data_dir),
            confirmed_file: cfg.confirmed_file.clone(),
            deaths_file: cfg.deaths_file.clone(),
            regions_file: cfg.regions_file.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SourceId) -> PathBuf {
        let name = match id {
            SourceId::Confirmed => &self.confirmed_file,
            SourceId::Deaths => &self.deaths_file,
            SourceId::Regions { .. } => &self.regions_file,
        };
        self.dir.join(name)
    }
}

#[async_trait]
impl TableSource for FileSource {
    async fn fetch(&self, id: &SourceId) -> FetchResult<RawTable> {
        let path = self.path_for(id);
        let bytes = tokio::fs::read(&path).await.map_err(|e| FetchError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        decode(id, &path.display().to_string(), &bytes)
    }

    fn location(&self, id: &SourceId) -> String {
        self.path_for(id).display().to_string()
    }
}
