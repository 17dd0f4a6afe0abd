//! Repository Layer
//!
//! Remote store abstraction and implementations.

mod db;
mod error;
mod rest_store;
mod sqlite_store;
mod sync_config;
mod traits;


pub use db::{init_db, DbState, SharedConnection};
pub use rest_store::RestStore;
pub use sqlite_store::SqliteStore;
pub use sync_config::{clear_sync_config, configure_sync, get_sync_config, SyncConfig};
pub use traits::{decode_rows, encode_row, CatalogOperations, RemoteStore, Row};
