//! SQLite Remote Store
//!
//! Local SQLite-backed implementation of [`RemoteStore`]. Used as the default
//! backend and as the store behind the test suite.

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::path::Path;

use crate::domain::{Collection, DomainError, DomainResult, RemoteId};
use super::db::{init_db, SharedConnection};
use super::traits::{RemoteStore, Row};

/// SQLite implementation of the remote store
pub struct SqliteStore {
    conn: SharedConnection,
}

impl SqliteStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Open (and migrate) the database at `path`; `:memory:` is accepted
    pub async fn open(path: &Path) -> DomainResult<Self> {
        let state = init_db(path).await?;
        Ok(Self::new(state.conn))
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn select(&self, collection: Collection, columns: &[&str]) -> DomainResult<Vec<Row>> {
        let columns = readable_columns(collection, columns)?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(not_initialized())?;

        let sql = format!(
            "SELECT {} FROM \"{}\" ORDER BY id",
            quote_columns(&columns),
            collection.table()
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(read_row(row, &columns)?);
        }
        Ok(result)
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> DomainResult<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(not_initialized())?;
        let tx = conn.transaction()?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut inserted = Vec::with_capacity(rows.len());
        for row in &rows {
            let (columns, mut values) = writable_values(collection, row)?;
            values.push(SqlValue::Integer(now));

            let mut names = columns.clone();
            names.push("updated_at");
            let placeholders = vec!["?"; names.len()].join(", ");
            let sql = format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                collection.table(),
                quote_columns(&names),
                placeholders
            );
            tx.execute(&sql, params_from_iter(values))?;

            let id = tx.last_insert_rowid();
            inserted.push(fetch_by_id(&tx, collection, id)?.ok_or_else(|| {
                DomainError::Internal(format!("Inserted row {} vanished from {}", id, collection))
            })?);
        }

        tx.commit()?;
        log::debug!("Inserted {} rows into {}", inserted.len(), collection);
        Ok(inserted)
    }

    async fn update(
        &self,
        collection: Collection,
        patches: Vec<(RemoteId, Row)>,
    ) -> DomainResult<Vec<Row>> {
        if patches.is_empty() {
            return Ok(Vec::new());
        }
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(not_initialized())?;
        let tx = conn.transaction()?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut updated = Vec::with_capacity(patches.len());
        for (id, patch) in &patches {
            let (columns, mut values) = writable_values(collection, patch)?;
            let mut assignments: Vec<String> =
                columns.iter().map(|c| format!("\"{}\" = ?", c)).collect();
            assignments.push("updated_at = ?".to_string());
            values.push(SqlValue::Integer(now));
            values.push(SqlValue::Integer(*id));

            let sql = format!(
                "UPDATE \"{}\" SET {} WHERE id = ?",
                collection.table(),
                assignments.join(", ")
            );
            if tx.execute(&sql, params_from_iter(values))? == 0 {
                log::warn!("Update skipped: {} has no row {}", collection, id);
                continue;
            }
            if let Some(row) = fetch_by_id(&tx, collection, *id)? {
                updated.push(row);
            }
        }

        tx.commit()?;
        Ok(updated)
    }

    async fn delete_by_ids(&self, collection: Collection, ids: &[RemoteId]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(not_initialized())?;

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM \"{}\" WHERE id IN ({})",
            collection.table(),
            placeholders
        );
        let removed = conn.execute(&sql, params_from_iter(ids.iter()))?;
        log::debug!("Deleted {} of {} rows from {}", removed, ids.len(), collection);
        Ok(())
    }
}

fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

/// Requested columns, validated against the collection (all when empty)
fn readable_columns(collection: Collection, columns: &[&str]) -> DomainResult<Vec<&'static str>> {
    if columns.is_empty() {
        return Ok(collection.columns().to_vec());
    }
    columns
        .iter()
        .map(|requested| {
            collection
                .columns()
                .iter()
                .find(|known| **known == *requested)
                .copied()
                .ok_or_else(|| {
                    DomainError::InvalidInput(format!("Unknown column {} in {}", requested, collection))
                })
        })
        .collect()
}

/// Columns present in `row` in schema order, with their SQL values
fn writable_values(collection: Collection, row: &Row) -> DomainResult<(Vec<&'static str>, Vec<SqlValue>)> {
    if let Some(unknown) = row
        .keys()
        .find(|key| !collection.writable_columns().iter().any(|c| *c == key.as_str()))
    {
        return Err(DomainError::InvalidInput(format!(
            "Column {} is not writable in {}",
            unknown, collection
        )));
    }

    let mut columns = Vec::new();
    let mut values = Vec::new();
    for column in collection.writable_columns() {
        if let Some(value) = row.get(*column) {
            columns.push(*column);
            values.push(to_sql_value(column, value)?);
        }
    }
    Ok((columns, values))
}

fn quote_columns(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fetch_by_id(conn: &Connection, collection: Collection, id: RemoteId) -> DomainResult<Option<Row>> {
    let columns = collection.columns();
    let sql = format!(
        "SELECT {} FROM \"{}\" WHERE id = ?",
        quote_columns(columns),
        collection.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(read_row(row, columns)?)),
        None => Ok(None),
    }
}

fn read_row(row: &rusqlite::Row, columns: &[&str]) -> DomainResult<Row> {
    let mut map = Row::new();
    for (i, column) in columns.iter().enumerate() {
        map.insert(column.to_string(), from_sql_value(row.get_ref(i)?));
    }
    Ok(map)
}

fn to_sql_value(column: &str, value: &Value) -> DomainResult<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(DomainError::InvalidInput(format!(
                "Column {} only accepts scalar values",
                column
            )))
        }
    })
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
