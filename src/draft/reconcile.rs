//! Reconcile Operations
//!
//! Mutations the sync engine applies once the remote store confirms a phase.
//! Not part of the editing surface.

use crate::domain::{EditState, LocalId, RemoteId};

use super::store::DraftStore;

impl DraftStore {
    /// Record the remote id assigned to an inserted theme
    pub(crate) fn confirm_theme_insert(&mut self, local_id: LocalId, id: RemoteId) -> bool {
        match self.themes.iter_mut().find(|t| t.local_id == local_id) {
            Some(theme) => {
                theme.id = Some(id);
                theme.state = EditState::Clean;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_theme_clean(&mut self, local_id: LocalId) -> bool {
        match self.themes.iter_mut().find(|t| t.local_id == local_id) {
            Some(theme) => {
                theme.state = EditState::Clean;
                true
            }
            None => false,
        }
    }

    /// Record the remote id assigned to an inserted question
    pub(crate) fn confirm_question_insert(&mut self, local_id: LocalId, id: RemoteId) -> bool {
        match self.questions.iter_mut().find(|q| q.local_id == local_id) {
            Some(question) => {
                question.id = Some(id);
                question.state = EditState::Clean;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_question_clean(&mut self, local_id: LocalId) -> bool {
        match self.questions.iter_mut().find(|q| q.local_id == local_id) {
            Some(question) => {
                question.state = EditState::Clean;
                true
            }
            None => false,
        }
    }

    /// Turn a theme the remote store no longer has back into an unsaved one.
    ///
    /// Its questions were cascaded away remotely, so they become unsaved
    /// orphans and are re-inserted under the theme's next id.
    pub(crate) fn requeue_theme(&mut self, local_id: LocalId) -> bool {
        let Some(theme) = self.themes.iter_mut().find(|t| t.local_id == local_id) else {
            return false;
        };
        theme.id = None;
        theme.state = EditState::Unsynced;

        for question in self.questions.iter_mut().filter(|q| q.theme == local_id) {
            question.id = None;
            question.topic_id = None;
            question.state = EditState::Unsynced;
        }
        true
    }

    /// Turn a question the remote store no longer has back into an unsaved one
    pub(crate) fn requeue_question(&mut self, local_id: LocalId) -> bool {
        match self.questions.iter_mut().find(|q| q.local_id == local_id) {
            Some(question) => {
                question.id = None;
                question.state = EditState::Unsynced;
                true
            }
            None => false,
        }
    }

    /// Give orphan questions their parent's remote id.
    ///
    /// `resolve` maps a theme's local id to its remote id. Returns how many
    /// questions were rewritten; unresolved ones keep `topic_id = None`.
    pub(crate) fn resolve_orphans<F>(&mut self, resolve: F) -> usize
    where
        F: Fn(LocalId) -> Option<RemoteId>,
    {
        let mut resolved = 0;
        for question in self.questions.iter_mut().filter(|q| q.topic_id.is_none()) {
            if let Some(topic_id) = resolve(question.theme) {
                question.topic_id = Some(topic_id);
                resolved += 1;
            }
        }
        resolved
    }

    pub(crate) fn forget_deleted_themes(&mut self, ids: &[RemoteId]) {
        for id in ids {
            self.deleted_theme_ids.remove(id);
        }
    }

    pub(crate) fn forget_deleted_questions(&mut self, ids: &[RemoteId]) {
        for id in ids {
            self.deleted_question_ids.remove(id);
        }
    }
}
