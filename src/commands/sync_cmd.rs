//! Cloud Sync Commands
//!
//! Connect the editor to a PostgREST endpoint or fall back to the local
//! SQLite file.

use std::path::Path;

use crate::repository::{clear_sync_config, configure_sync, get_sync_config, RestStore, SyncConfig};

/// Configure cloud sync. The endpoint is checked first unless `skip_check`.
pub async fn configure_cloud_sync(
    db_path: &Path,
    url: String,
    token: String,
    skip_check: bool,
) -> Result<(), String> {
    let config = SyncConfig { url, token };
    let store = RestStore::new(&config).map_err(|e| e.to_string())?;

    if skip_check {
        log::warn!("Saving sync configuration without validating {}", config.url);
    } else {
        store
            .validate()
            .await
            .map_err(|e| format!("Connection check failed: {}", e))?;
        log::info!("Connection to {} validated", config.url);
    }

    configure_sync(db_path, config.url, config.token).map_err(|e| e.to_string())
}

/// Remove the cloud configuration; the local database is used again
pub fn disconnect_cloud_sync(db_path: &Path) -> Result<(), String> {
    clear_sync_config(db_path).map_err(|e| e.to_string())?;
    log::info!("Cloud sync disconnected");
    Ok(())
}

/// Current cloud endpoint, if configured
pub fn get_cloud_sync_url(db_path: &Path) -> Option<String> {
    get_sync_config(db_path)
        .filter(SyncConfig::is_usable)
        .map(|config| config.url)
}
