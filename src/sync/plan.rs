//! Save Classification
//!
//! Snapshot of what a save has to send, taken from the draft at invocation.

use crate::domain::{EditState, Entity, LocalId, RemoteId};
use crate::draft::DraftStore;

/// Records grouped by edit state, keyed by local id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Themes without a remote id
    pub new_themes: Vec<LocalId>,
    /// Persisted themes with local edits
    pub changed_themes: Vec<LocalId>,
    pub existing_themes: Vec<LocalId>,
    /// Questions without a remote id
    pub new_questions: Vec<LocalId>,
    /// Persisted questions with local edits
    pub updated_questions: Vec<LocalId>,
    pub existing_questions: Vec<LocalId>,
    pub deleted_theme_ids: Vec<RemoteId>,
    pub deleted_question_ids: Vec<RemoteId>,
}

struct Partition {
    new: Vec<LocalId>,
    changed: Vec<LocalId>,
    existing: Vec<LocalId>,
}

/// Absence of a remote id is definitive; persisted records split on state
fn partition<E: Entity>(entities: &[E]) -> Partition {
    let mut partition = Partition {
        new: Vec::new(),
        changed: Vec::new(),
        existing: Vec::new(),
    };
    for entity in entities {
        let bucket = match (entity.remote_id(), entity.state()) {
            (None, _) => &mut partition.new,
            (Some(_), EditState::Clean) => &mut partition.existing,
            (Some(_), _) => &mut partition.changed,
        };
        bucket.push(entity.local_id());
    }
    partition
}

impl SyncPlan {
    pub fn classify(draft: &DraftStore) -> Self {
        let themes = partition(draft.themes());
        let questions = partition(draft.questions());

        Self {
            new_themes: themes.new,
            changed_themes: themes.changed,
            existing_themes: themes.existing,
            new_questions: questions.new,
            updated_questions: questions.changed,
            existing_questions: questions.existing,
            deleted_theme_ids: draft.deleted_theme_ids().iter().copied().collect(),
            deleted_question_ids: draft.deleted_question_ids().iter().copied().collect(),
        }
    }

    /// Nothing to send
    pub fn is_empty(&self) -> bool {
        self.new_themes.is_empty()
            && self.changed_themes.is_empty()
            && self.new_questions.is_empty()
            && self.updated_questions.is_empty()
            && self.deleted_theme_ids.is_empty()
            && self.deleted_question_ids.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "themes: {} new, {} changed, {} unchanged, {} deleted; questions: {} new, {} updated, {} unchanged, {} deleted",
            self.new_themes.len(),
            self.changed_themes.len(),
            self.existing_themes.len(),
            self.deleted_theme_ids.len(),
            self.new_questions.len(),
            self.updated_questions.len(),
            self.existing_questions.len(),
            self.deleted_question_ids.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuestionRow, ThemeField, ThemeRow};

    #[test]
    fn test_classify_mixed_draft() {
        let mut draft = DraftStore::load(
            vec![
                ThemeRow { id: 1, name: "X".to_string() },
                ThemeRow { id: 2, name: "Y".to_string() },
            ],
            vec![
                QuestionRow { id: 10, topic_id: Some(1), question: "a".to_string() },
                QuestionRow { id: 11, topic_id: Some(2), question: "b".to_string() },
            ],
        );
        draft.update_theme(1, ThemeField::Name("Y2".to_string()));
        draft.update_question(0, "a2");
        let fresh = draft.add_theme("Z").unwrap();
        let orphan = draft.add_question(0).unwrap();
        draft.remove_question(draft.question_index(orphan).unwrap());
        let orphan = draft.add_question(0).unwrap();

        let plan = SyncPlan::classify(&draft);

        assert_eq!(plan.new_themes, vec![fresh]);
        assert_eq!(plan.changed_themes.len(), 1);
        assert_eq!(plan.existing_themes.len(), 1);
        assert_eq!(plan.new_questions, vec![orphan]);
        assert_eq!(plan.updated_questions.len(), 1);
        assert_eq!(plan.existing_questions.len(), 1);
        assert!(plan.deleted_question_ids.is_empty());
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_clean_draft_has_empty_plan() {
        let draft = DraftStore::load(vec![ThemeRow { id: 1, name: "X".to_string() }], vec![]);
        let plan = SyncPlan::classify(&draft);
        assert!(plan.is_empty());
        assert_eq!(plan.existing_themes.len(), 1);
    }
}
