//! Theme Entity
//!
//! A named group owning zero or more questions (stored remotely as a topic).

use serde::{Deserialize, Serialize};
use super::entity::{EditState, Entity, LocalId, RemoteId};

/// A theme in the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Draft-local identifier
    pub local_id: LocalId,
    /// Remote identifier, `None` until persisted
    pub id: Option<RemoteId>,
    /// Display name
    pub name: String,
    pub state: EditState,
}

/// Editable theme fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeField {
    Name(String),
}

impl Theme {
    /// A theme that exists only in the draft
    pub fn new(local_id: LocalId, name: String) -> Self {
        Self {
            local_id,
            id: None,
            name,
            state: EditState::Unsynced,
        }
    }

    /// A theme loaded from the remote store
    pub fn persisted(local_id: LocalId, id: RemoteId, name: String) -> Self {
        Self {
            local_id,
            id: Some(id),
            name,
            state: EditState::Clean,
        }
    }

    /// Has local edits not yet confirmed by the remote store
    pub fn is_new(&self) -> bool {
        self.state != EditState::Clean
    }

    pub(crate) fn apply(&mut self, field: ThemeField) {
        match field {
            ThemeField::Name(name) => self.name = name,
        }
        self.state = self.state.edited();
    }
}

impl Entity for Theme {
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
    fn test_theme_creation() {
        let theme = Theme::new(LocalId(1), "Work".to_string());
        assert_eq!(theme.local_id(), LocalId(1));
        assert!(theme.id.is_none());
        assert!(theme.is_new());
    }

    #[test]
    fn test_edit_marks_persisted_theme_dirty() {
        let mut theme = Theme::persisted(LocalId(2), 5, "Old".to_string());
        assert!(!theme.is_new());

        theme.apply(ThemeField::Name("New".to_string()));
        assert_eq!(theme.name, "New");
        assert_eq!(theme.state, EditState::Dirty);
        assert!(theme.is_new());
    }
}
