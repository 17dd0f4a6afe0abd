//! Catalog Commands
//!
//! Listing, save preview and save over a [`Session`].

use serde::Serialize;

use crate::domain::{EditState, RemoteId};
use crate::draft::DraftStore;
use crate::session::Session;
use crate::sync::SyncReport;

/// A question as listed to the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    /// Index accepted by `remove_question` / `update_question`
    pub index: usize,
    pub id: Option<RemoteId>,
    pub topic_id: Option<RemoteId>,
    pub question: String,
    pub state: EditState,
}

/// A theme and its questions as listed to the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeView {
    pub index: usize,
    pub id: Option<RemoteId>,
    pub name: String,
    pub state: EditState,
    pub questions: Vec<QuestionView>,
}

/// Save preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavePreview {
    pub summary: String,
    pub pending: bool,
}

pub fn catalog_view(draft: &DraftStore) -> Vec<ThemeView> {
    draft
        .themes()
        .iter()
        .enumerate()
        .map(|(index, theme)| ThemeView {
            index,
            id: theme.id,
            name: theme.name.clone(),
            state: theme.state,
            questions: draft
                .questions_of(index)
                .into_iter()
                .map(|(index, question)| QuestionView {
                    index,
                    id: question.id,
                    topic_id: question.topic_id,
                    question: question.question.clone(),
                    state: question.state,
                })
                .collect(),
        })
        .collect()
}

/// List the draft catalog
pub async fn list_catalog(session: &Session) -> Result<Vec<ThemeView>, String> {
    let draft = session.snapshot().await;
    Ok(catalog_view(&draft))
}

/// Describe what a save would send without sending it
pub async fn preview_save(session: &Session) -> Result<SavePreview, String> {
    let plan = session.plan().await;
    Ok(SavePreview {
        summary: plan.summary(),
        pending: !plan.is_empty(),
    })
}

/// Persist the draft
pub async fn save_changes(session: &Session) -> Result<SyncReport, String> {
    session.save().await.map_err(|e| e.to_string())
}
