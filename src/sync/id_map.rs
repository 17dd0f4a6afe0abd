//! Local to remote identifier map for themes

use std::collections::HashMap;

use crate::domain::{LocalId, RemoteId};
use crate::draft::DraftStore;

#[derive(Debug, Clone, Default)]
pub struct IdMap {
    themes: HashMap<LocalId, RemoteId>,
}

impl IdMap {
    /// Seeded with every theme that already has a remote id
    pub fn from_draft(draft: &DraftStore) -> Self {
        let themes = draft
            .themes()
            .iter()
            .filter_map(|t| t.id.map(|id| (t.local_id, id)))
            .collect();
        Self { themes }
    }

    pub fn insert(&mut self, local_id: LocalId, id: RemoteId) {
        self.themes.insert(local_id, id);
    }

    /// Forget a theme whose remote row is gone
    pub fn remove(&mut self, local_id: LocalId) {
        self.themes.remove(&local_id);
    }

    pub fn get(&self, local_id: LocalId) -> Option<RemoteId> {
        self.themes.get(&local_id).copied()
    }
}
