//! Edit Commands
//!
//! Serialisable draft edits. A script is a JSON array of commands, e.g.
//! `[{"op": "add_theme", "name": "Onboarding"}, {"op": "add_question", "theme_index": 0, "text": "Why?"}]`.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, ThemeField};
use crate::draft::DraftStore;
use crate::session::Session;

/// One draft edit, addressed by the indices the catalog listing shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddTheme {
        name: String,
    },
    RemoveTheme {
        index: usize,
    },
    UpdateTheme {
        index: usize,
        field: ThemeField,
    },
    AddQuestion {
        theme_index: usize,
        /// Initial text; the question starts empty when omitted
        #[serde(default)]
        text: Option<String>,
    },
    RemoveQuestion {
        index: usize,
    },
    UpdateQuestion {
        index: usize,
        text: String,
    },
}

impl EditCommand {
    /// Apply to `draft`. Returns false when the draft ignored the edit.
    pub fn apply(self, draft: &mut DraftStore) -> bool {
        match self {
            EditCommand::AddTheme { name } => draft.add_theme(&name).is_some(),
            EditCommand::RemoveTheme { index } => draft.remove_theme(index),
            EditCommand::UpdateTheme { index, field } => draft.update_theme(index, field),
            EditCommand::AddQuestion { theme_index, text } => {
                let Some(local_id) = draft.add_question(theme_index) else {
                    return false;
                };
                if let (Some(text), Some(index)) = (text, draft.question_index(local_id)) {
                    draft.update_question(index, &text);
                }
                true
            }
            EditCommand::RemoveQuestion { index } => draft.remove_question(index),
            EditCommand::UpdateQuestion { index, text } => draft.update_question(index, &text),
        }
    }
}

/// Parse a JSON edit script
pub fn parse_script(source: &str) -> DomainResult<Vec<EditCommand>> {
    serde_json::from_str(source)
        .map_err(|e| DomainError::InvalidInput(format!("Invalid edit script: {}", e)))
}

/// Apply a script to the session draft, returning how many edits took effect
pub async fn apply_edits(session: &Session, commands: Vec<EditCommand>) -> Result<usize, String> {
    let total = commands.len();
    let applied = session.apply_all(commands).await;
    if applied < total {
        log::warn!("{} of {} edits were ignored", total - applied, total);
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuestionRow, ThemeRow};

    #[test]
    fn test_parse_script() {
        let commands = parse_script(
            r#"[
                {"op": "add_theme", "name": "A"},
                {"op": "update_theme", "index": 0, "field": {"name": "B"}},
                {"op": "add_question", "theme_index": 0},
                {"op": "update_question", "index": 0, "text": "Why?"},
                {"op": "remove_question", "index": 0},
                {"op": "remove_theme", "index": 0}
            ]"#,
        )
        .unwrap();

        assert_eq!(commands.len(), 6);
        assert_eq!(
            commands[1],
            EditCommand::UpdateTheme { index: 0, field: ThemeField::Name("B".to_string()) }
        );
        assert_eq!(commands[2], EditCommand::AddQuestion { theme_index: 0, text: None });
    }

    #[test]
    fn test_parse_script_rejects_unknown_op() {
        let err = parse_script(r#"[{"op": "rename_everything"}]"#).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_add_question_with_text_stays_new() {
        let mut draft = DraftStore::load(vec![ThemeRow { id: 1, name: "X".to_string() }], vec![]);

        let applied = EditCommand::AddQuestion { theme_index: 0, text: Some("Q1".to_string()) }
            .apply(&mut draft);

        assert!(applied);
        let question = &draft.questions()[0];
        assert_eq!(question.question, "Q1");
        assert_eq!(question.topic_id, Some(1));
        assert!(question.is_new());
        assert!(!question.is_updated());
    }

    #[test]
    fn test_ignored_edits_report_false() {
        let mut draft = DraftStore::load(
            vec![ThemeRow { id: 1, name: "X".to_string() }],
            vec![QuestionRow { id: 5, topic_id: Some(1), question: "q".to_string() }],
        );

        assert!(!EditCommand::AddTheme { name: "  ".to_string() }.apply(&mut draft));
        assert!(!EditCommand::AddTheme { name: "X".to_string() }.apply(&mut draft));
        assert!(!EditCommand::RemoveTheme { index: 3 }.apply(&mut draft));
        assert!(!EditCommand::AddQuestion { theme_index: 9, text: None }.apply(&mut draft));
        assert!(!EditCommand::UpdateQuestion { index: 9, text: "t".to_string() }.apply(&mut draft));
        assert!(!draft.has_pending_changes());
    }
}
