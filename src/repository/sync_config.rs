//! Cloud Sync Configuration
//!
//! The remote endpoint and token are kept in `sync_config.json` next to the
//! local database file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, DomainResult};

const CONFIG_FILE: &str = "sync_config.json";

/// Remote endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub url: String,
    pub token: String,
}

impl SyncConfig {
    /// Both fields set
    pub fn is_usable(&self) -> bool {
        !self.url.trim().is_empty() && !self.token.trim().is_empty()
    }
}

fn config_path(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(|dir| dir.join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Read the sync configuration stored next to `db_path`, if any
pub fn get_sync_config(db_path: &Path) -> Option<SyncConfig> {
    let path = config_path(db_path);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

/// Persist the sync configuration next to `db_path`
pub fn configure_sync(db_path: &Path, url: String, token: String) -> DomainResult<()> {
    let config = SyncConfig { url, token };
    if !config.is_usable() {
        return Err(DomainError::InvalidInput("url and token are required".to_string()));
    }

    let path = config_path(db_path);
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .map_err(|e| DomainError::Internal(format!("Failed to create {}: {}", dir.display(), e)))?;
        }
    }
    let json = serde_json::to_string_pretty(&config)?;
    std::fs::write(&path, json)
        .map_err(|e| DomainError::Internal(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("Sync configuration saved to {}", path.display());
    Ok(())
}

/// Remove the stored sync configuration; local storage is used afterwards
pub fn clear_sync_config(db_path: &Path) -> DomainResult<()> {
    let path = config_path(db_path);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DomainError::Internal(format!("Failed to remove {}: {}", path.display(), e))),
    }
}
