//! Draft Store
//!
//! In-memory themes and questions plus the ids queued for remote deletion.
//! Every edit operation is synchronous and infallible: invalid input (empty or
//! duplicate names, out-of-range indices) is ignored.

use std::collections::BTreeSet;

use crate::domain::{
    EditState, Entity, LocalId, Question, QuestionRow, RemoteId, Theme, ThemeField, ThemeRow,
};

/// Local edit buffer for the theme/question catalog
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    pub(super) themes: Vec<Theme>,
    pub(super) questions: Vec<Question>,
    pub(super) deleted_theme_ids: BTreeSet<RemoteId>,
    pub(super) deleted_question_ids: BTreeSet<RemoteId>,
    next_local_id: u64,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean draft from remote rows.
    ///
    /// Questions without a `topic_id`, or whose `topic_id` matches none of
    /// `themes`, are skipped.
    pub fn load(themes: Vec<ThemeRow>, questions: Vec<QuestionRow>) -> Self {
        let mut draft = Self::new();

        for row in themes {
            let local_id = draft.allocate_id();
            draft.themes.push(Theme::persisted(local_id, row.id, row.name));
        }

        for row in questions {
            let Some(topic_id) = row.topic_id else {
                log::warn!("Skipping question {}: it has no topic", row.id);
                continue;
            };
            let Some(parent) = draft.themes.iter().find(|t| t.id == Some(topic_id)) else {
                log::warn!("Skipping question {}: topic {} is not loaded", row.id, topic_id);
                continue;
            };
            let parent = parent.local_id;
            let local_id = draft.allocate_id();
            draft.questions.push(Question::persisted(
                local_id,
                parent,
                row.id,
                topic_id,
                row.question,
            ));
        }

        log::debug!(
            "Draft loaded: {} themes, {} questions",
            draft.themes.len(),
            draft.questions.len()
        );
        draft
    }

    fn allocate_id(&mut self) -> LocalId {
        self.next_local_id += 1;
        LocalId(self.next_local_id)
    }

    // ========================
    // Edit operations
    // ========================

    /// Prepend a new theme. Ignored if the trimmed name is empty or already used.
    pub fn add_theme(&mut self, name: &str) -> Option<LocalId> {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.themes.iter().any(|t| t.name == trimmed) {
            return None;
        }

        let local_id = self.allocate_id();
        self.themes.insert(0, Theme::new(local_id, trimmed.to_string()));
        Some(local_id)
    }

    /// Remove a theme and every question it owns.
    ///
    /// Persisted ids of the theme and of its questions are queued for deletion.
    pub fn remove_theme(&mut self, index: usize) -> bool {
        if index >= self.themes.len() {
            return false;
        }
        let theme = self.themes.remove(index);
        if let Some(id) = theme.id {
            self.deleted_theme_ids.insert(id);
        }

        let deleted_question_ids = &mut self.deleted_question_ids;
        self.questions.retain(|q| {
            if q.theme != theme.local_id {
                return true;
            }
            if let Some(id) = q.id {
                deleted_question_ids.insert(id);
            }
            false
        });
        true
    }

    /// Append an empty question to the theme at `theme_index`
    pub fn add_question(&mut self, theme_index: usize) -> Option<LocalId> {
        let theme = self.themes.get(theme_index)?;
        let (parent, topic_id) = (theme.local_id, theme.id);

        let local_id = self.allocate_id();
        self.questions.push(Question::new(local_id, parent, topic_id));
        Some(local_id)
    }

    /// Remove a question, queueing its id for deletion if persisted
    pub fn remove_question(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        let question = self.questions.remove(index);
        if let Some(id) = question.id {
            self.deleted_question_ids.insert(id);
        }
        true
    }

    /// Replace a question's text. Only persisted questions become updated.
    pub fn update_question(&mut self, index: usize, text: &str) -> bool {
        match self.questions.get_mut(index) {
            Some(question) => {
                question.set_text(text.to_string());
                true
            }
            None => false,
        }
    }

    /// Set a theme field. Persisted themes become dirty, unsaved ones stay unsaved.
    pub fn update_theme(&mut self, index: usize, field: ThemeField) -> bool {
        match self.themes.get_mut(index) {
            Some(theme) => {
                theme.apply(field);
                true
            }
            None => false,
        }
    }

    // ========================
    // Queries
    // ========================

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn deleted_theme_ids(&self) -> &BTreeSet<RemoteId> {
        &self.deleted_theme_ids
    }

    pub fn deleted_question_ids(&self) -> &BTreeSet<RemoteId> {
        &self.deleted_question_ids
    }

    pub fn theme(&self, local_id: LocalId) -> Option<&Theme> {
        self.themes.iter().find(|t| t.local_id == local_id)
    }

    pub fn question(&self, local_id: LocalId) -> Option<&Question> {
        self.questions.iter().find(|q| q.local_id == local_id)
    }

    pub fn theme_index(&self, local_id: LocalId) -> Option<usize> {
        self.themes.iter().position(|t| t.local_id == local_id)
    }

    pub fn question_index(&self, local_id: LocalId) -> Option<usize> {
        self.questions.iter().position(|q| q.local_id == local_id)
    }

    /// Questions of the theme at `theme_index`, paired with their indices in
    /// [`DraftStore::questions`]
    pub fn questions_of(&self, theme_index: usize) -> Vec<(usize, &Question)> {
        let Some(theme) = self.themes.get(theme_index) else {
            return Vec::new();
        };
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.theme == theme.local_id)
            .collect()
    }

    /// Anything a save would send
    pub fn has_pending_changes(&self) -> bool {
        !self.deleted_theme_ids.is_empty()
            || !self.deleted_question_ids.is_empty()
            || self.themes.iter().any(|t| t.state() != EditState::Clean)
            || self.questions.iter().any(|q| q.state() != EditState::Clean)
    }
}
