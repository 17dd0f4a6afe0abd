//! Test doubles wrapping the in-memory SQLite store

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::{Collection, DomainError, DomainResult, RemoteId};
use crate::repository::{RemoteStore, Row, SqliteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
}

/// Store that fails selected operations and counts calls
pub struct FlakyStore {
    inner: SqliteStore,
    failing: Mutex<HashSet<(Collection, Op)>>,
    calls: Mutex<Vec<(Collection, Op, usize)>>,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: SqliteStore::open(&PathBuf::from(":memory:"))
                .await
                .expect("in-memory store"),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self, collection: Collection, op: Op) {
        self.failing.lock().unwrap().insert((collection, op));
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Recorded calls as (collection, op, batch size)
    pub fn calls(&self) -> Vec<(Collection, Op, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn enter(&self, collection: Collection, op: Op, size: usize) -> DomainResult<()> {
        self.calls.lock().unwrap().push((collection, op, size));
        if self.failing.lock().unwrap().contains(&(collection, op)) {
            return Err(DomainError::Remote(format!("injected {:?} failure on {}", op, collection)));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FlakyStore {
    async fn select(&self, collection: Collection, columns: &[&str]) -> DomainResult<Vec<Row>> {
        self.enter(collection, Op::Select, 0)?;
        self.inner.select(collection, columns).await
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> DomainResult<Vec<Row>> {
        self.enter(collection, Op::Insert, rows.len())?;
        self.inner.insert(collection, rows).await
    }

    async fn update(
        &self,
        collection: Collection,
        patches: Vec<(RemoteId, Row)>,
    ) -> DomainResult<Vec<Row>> {
        self.enter(collection, Op::Update, patches.len())?;
        self.inner.update(collection, patches).await
    }

    async fn delete_by_ids(&self, collection: Collection, ids: &[RemoteId]) -> DomainResult<()> {
        self.enter(collection, Op::Delete, ids.len())?;
        self.inner.delete_by_ids(collection, ids).await
    }
}

/// Store whose inserts block until released
pub struct GatedStore {
    inner: SqliteStore,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    pub inserts: AtomicUsize,
}

impl GatedStore {
    pub async fn new() -> Self {
        Self {
            inner: SqliteStore::open(&PathBuf::from(":memory:"))
                .await
                .expect("in-memory store"),
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn select(&self, collection: Collection, columns: &[&str]) -> DomainResult<Vec<Row>> {
        self.inner.select(collection, columns).await
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> DomainResult<Vec<Row>> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.insert(collection, rows).await
    }

    async fn update(
        &self,
        collection: Collection,
        patches: Vec<(RemoteId, Row)>,
    ) -> DomainResult<Vec<Row>> {
        self.inner.update(collection, patches).await
    }

    async fn delete_by_ids(&self, collection: Collection, ids: &[RemoteId]) -> DomainResult<()> {
        self.inner.delete_by_ids(collection, ids).await
    }
}

/// Store serving fixed rows, for payloads SQLite would never produce
#[derive(Default)]
pub struct StubStore {
    pub themes: Mutex<Vec<Row>>,
    pub questions: Mutex<Vec<Row>>,
}

impl StubStore {
    fn rows(&self, collection: Collection) -> &Mutex<Vec<Row>> {
        match collection {
            Collection::Themes => &self.themes,
            Collection::Questions => &self.questions,
        }
    }
}

#[async_trait]
impl RemoteStore for StubStore {
    async fn select(&self, collection: Collection, _columns: &[&str]) -> DomainResult<Vec<Row>> {
        Ok(self.rows(collection).lock().unwrap().clone())
    }

    async fn insert(&self, collection: Collection, _rows: Vec<Row>) -> DomainResult<Vec<Row>> {
        Err(DomainError::Remote(format!("{} is read-only", collection)))
    }

    async fn update(
        &self,
        collection: Collection,
        _patches: Vec<(RemoteId, Row)>,
    ) -> DomainResult<Vec<Row>> {
        Err(DomainError::Remote(format!("{} is read-only", collection)))
    }

    async fn delete_by_ids(&self, collection: Collection, _ids: &[RemoteId]) -> DomainResult<()> {
        Err(DomainError::Remote(format!("{} is read-only", collection)))
    }
}
