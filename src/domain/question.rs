//! Question Entity
//!
//! A text prompt belonging to exactly one theme.

use serde::{Deserialize, Serialize};
use super::entity::{EditState, Entity, LocalId, RemoteId};

/// A question in the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub local_id: LocalId,
    /// Owning theme's local id
    pub theme: LocalId,
    /// Remote identifier, `None` until persisted
    pub id: Option<RemoteId>,
    /// Owning theme's remote id, `None` while that theme is unsaved
    pub topic_id: Option<RemoteId>,
    /// Prompt text (may be empty while editing)
    pub question: String,
    pub state: EditState,
}

impl Question {
    /// An empty question that exists only in the draft
    pub fn new(local_id: LocalId, theme: LocalId, topic_id: Option<RemoteId>) -> Self {
        Self {
            local_id,
            theme,
            id: None,
            topic_id,
            question: String::new(),
            state: EditState::Unsynced,
        }
    }

    /// A question loaded from the remote store
    pub fn persisted(local_id: LocalId, theme: LocalId, id: RemoteId, topic_id: RemoteId, question: String) -> Self {
        Self {
            local_id,
            theme,
            id: Some(id),
            topic_id: Some(topic_id),
            question,
            state: EditState::Clean,
        }
    }

    /// Never persisted
    pub fn is_new(&self) -> bool {
        self.state == EditState::Unsynced
    }

    /// Persisted and edited since the last sync
    pub fn is_updated(&self) -> bool {
        self.state == EditState::Dirty
    }

    /// Owning theme has no remote id yet
    pub fn is_orphan(&self) -> bool {
        self.topic_id.is_none()
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.question = text;
        self.state = self.state.edited();
    }
}

impl Entity for Question {
    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.id
    }

    fn state(&self) -> EditState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_question_is_orphan_without_parent_id() {
        let q = Question::new(LocalId(3), LocalId(1), None);
        assert!(q.is_new());
        assert!(!q.is_updated());
        assert!(q.is_orphan());
    }

    #[test]
    fn test_editing_new_question_never_marks_updated() {
        let mut q = Question::new(LocalId(3), LocalId(1), Some(4));
        q.set_text("Why?".to_string());
        assert!(q.is_new());
        assert!(!q.is_updated());
    }

    #[test]
    fn test_editing_persisted_question_marks_updated() {
        let mut q = Question::persisted(LocalId(3), LocalId(1), 10, 4, "Old".to_string());
        q.set_text("New".to_string());
        assert!(q.is_updated());
        assert!(!q.is_new());
    }
}
