//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations for the local store.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared connection slot
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
}

impl DbState {
    pub fn new() -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Drop the connection; later operations fail until re-initialized
    pub async fn close(&self) {
        *self.conn.lock().await = None;
    }

    pub async fn is_open(&self) -> bool {
        self.conn.lock().await.is_some()
    }
}

impl Default for DbState {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the database at `db_path` (or `:memory:`) and run migrations
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = if db_path.as_os_str() == ":memory:" {
        Connection::open_in_memory()
    } else {
        Connection::open(db_path)
    }
    .map_err(|e| DomainError::Internal(format!("Failed to open {}: {}", db_path.display(), e)))?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(&conn)?;

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);
    log::info!("Database ready at {}", db_path.display());
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS topics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // Deleting a topic removes its questions server-side
    conn.execute(
        "CREATE TABLE IF NOT EXISTS \"topics-questions\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            question TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;

    for table in ["topics", "topics-questions"] {
        if !column_exists(conn, table, "updated_at")? {
            conn.execute(
                &format!("ALTER TABLE \"{}\" ADD COLUMN updated_at INTEGER", table),
                [],
            )
            .map_err(|e| DomainError::Internal(format!("Failed to add updated_at to {}: {}", table, e)))?;
        }
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_questions_topic ON \"topics-questions\"(topic_id)",
        [],
    )?;

    Ok(())
}
