//! Application Configuration
//!
//! Where the local database and the logs live, read from an optional JSON
//! file. The cloud endpoint is kept separately in `sync_config.json` next to
//! the database and can be overridden through the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{DomainError, DomainResult};
use crate::repository::{get_sync_config, RemoteStore, RestStore, SqliteStore, SyncConfig};

pub const DEFAULT_DATABASE: &str = "topic_editor.db";
pub const APP_NAME: &str = "topic-editor";

pub const URL_ENV: &str = "TOPIC_EDITOR_URL";
pub const TOKEN_ENV: &str = "TOPIC_EDITOR_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Local SQLite file; also anchors `sync_config.json`
    pub database: PathBuf,
    /// Defaults to `logs/` next to the database
    pub log_dir: Option<PathBuf>,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> DomainResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::NotFound(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DomainError::InvalidInput(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => self
                .database
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| dir.join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            eprintln!("Unknown log level {:?}, using info", self.log_level);
            log::LevelFilter::Info
        })
    }

    /// Cloud endpoint from the environment, else from `sync_config.json`
    pub fn sync_config(&self) -> Option<SyncConfig> {
        self.sync_config_with(|key| std::env::var(key).ok())
    }

    fn sync_config_with<F>(&self, env: F) -> Option<SyncConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(url), Some(token)) = (env(URL_ENV), env(TOKEN_ENV)) {
            let config = SyncConfig { url, token };
            if config.is_usable() {
                return Some(config);
            }
        }
        get_sync_config(&self.database).filter(SyncConfig::is_usable)
    }

    /// The REST store when a cloud endpoint is configured, else the local database
    pub async fn open_store(&self) -> DomainResult<Arc<dyn RemoteStore>> {
        self.open_store_for(self.sync_config()).await
    }

    async fn open_store_for(&self, sync: Option<SyncConfig>) -> DomainResult<Arc<dyn RemoteStore>> {
        match sync {
            Some(config) => {
                log::info!("Using remote store at {}", config.url);
                Ok(Arc::new(RestStore::new(&config)?))
            }
            None => {
                log::info!("Using local database {}", self.database.display());
                Ok(Arc::new(SqliteStore::open(&self.database).await?))
            }
        }
    }
}
