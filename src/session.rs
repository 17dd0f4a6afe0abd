//! Editing Session
//!
//! One draft plus the engine that saves it. Edits and saves are serialized on
//! the draft lock; a second save requested while one is running is rejected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::commands::EditCommand;
use crate::domain::{DomainError, DomainResult};
use crate::draft::DraftStore;
use crate::repository::RemoteStore;
use crate::sync::{SyncEngine, SyncPlan, SyncReport};

pub struct Session {
    engine: SyncEngine,
    draft: Mutex<DraftStore>,
    saving: AtomicBool,
}

/// Clears the in-flight flag when the save ends, including on cancellation
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Session {
    /// Session over an empty draft
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_draft(store, DraftStore::new())
    }

    pub fn with_draft(store: Arc<dyn RemoteStore>, draft: DraftStore) -> Self {
        Self {
            engine: SyncEngine::new(store),
            draft: Mutex::new(draft),
            saving: AtomicBool::new(false),
        }
    }

    /// Session over the current remote catalog
    pub async fn open(store: Arc<dyn RemoteStore>) -> DomainResult<Self> {
        let engine = SyncEngine::new(store);
        let draft = engine.fetch().await?;
        Ok(Self {
            engine,
            draft: Mutex::new(draft),
            saving: AtomicBool::new(false),
        })
    }

    /// Replace the draft with the remote catalog, discarding local edits
    pub async fn reload(&self) -> DomainResult<()> {
        if self.saving.load(Ordering::SeqCst) {
            return Err(DomainError::Conflict("A save is in progress".to_string()));
        }
        let fresh = self.engine.fetch().await?;
        *self.draft.lock().await = fresh;
        Ok(())
    }

    /// Apply one edit; false when the draft ignored it
    pub async fn apply(&self, command: EditCommand) -> bool {
        let mut draft = self.draft.lock().await;
        command.apply(&mut draft)
    }

    /// Apply edits in order under one lock, returning how many took effect
    pub async fn apply_all(&self, commands: Vec<EditCommand>) -> usize {
        let mut draft = self.draft.lock().await;
        commands
            .into_iter()
            .map(|command| command.apply(&mut draft))
            .filter(|applied| *applied)
            .count()
    }

    /// Copy of the current draft
    pub async fn snapshot(&self) -> DraftStore {
        self.draft.lock().await.clone()
    }

    pub async fn plan(&self) -> SyncPlan {
        SyncPlan::classify(&*self.draft.lock().await)
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Save the draft. Fails with `Conflict` if a save is already running.
    pub async fn save(&self) -> DomainResult<SyncReport> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Save requested while another save is running");
            return Err(DomainError::Conflict("A save is already in progress".to_string()));
        }
        let _guard = SavingGuard(&self.saving);

        let mut draft = self.draft.lock().await;
        Ok(self.engine.save(&mut draft).await)
    }
}
