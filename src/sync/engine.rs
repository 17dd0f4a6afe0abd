//! Sync Engine
//!
//! Persists the draft in six ordered phases. Parents are inserted before their
//! questions so that every question insert carries a real `topic_id`. Each
//! phase is guarded on its own: a failure is logged and reported, and the
//! remaining phases still run. Preconditions are read from the current draft,
//! so retrying a partially failed save only resends what is still pending.

use std::sync::Arc;

use crate::domain::{
    DomainError, DomainResult, LocalId, NewQuestionRow, NewThemeRow, QuestionPatch, RemoteId,
    ThemePatch,
};
use crate::draft::DraftStore;
use crate::repository::{CatalogOperations, RemoteStore};

use super::id_map::IdMap;
use super::plan::SyncPlan;
use super::report::{Phase, PhaseStatus, SyncReport, SAVING_MESSAGE};

/// Phase result: `None` when there was nothing to send
type PhaseResult = DomainResult<Option<usize>>;

pub struct SyncEngine {
    store: Arc<dyn RemoteStore>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Load a clean draft from the remote store
    pub async fn fetch(&self) -> DomainResult<DraftStore> {
        let themes = self.store.fetch_themes().await.map_err(|e| {
            log::error!("Error fetching topics: {}", e);
            e
        })?;
        let questions = self.store.fetch_questions().await.map_err(|e| {
            log::error!("Error fetching questions: {}", e);
            e
        })?;
        Ok(DraftStore::load(themes, questions))
    }

    /// Persist every pending edit in `draft`.
    ///
    /// The mutable borrow keeps the draft exclusive for the whole save.
    pub async fn save(&self, draft: &mut DraftStore) -> SyncReport {
        log::info!("{}", SAVING_MESSAGE);
        let plan = SyncPlan::classify(draft);
        log::info!("Save plan: {}", plan.summary());

        let mut id_map = IdMap::from_draft(draft);
        let mut report = SyncReport::default();

        let result = self.insert_themes(draft, &plan, &mut id_map).await;
        record(&mut report, Phase::InsertThemes, result);

        let result = self.update_themes(draft, &plan, &mut id_map).await;
        record(&mut report, Phase::UpdateThemes, result);

        let result = self.insert_questions(draft, &plan, &id_map, &mut report).await;
        record(&mut report, Phase::InsertQuestions, result);

        let result = self.update_questions(draft, &plan).await;
        record(&mut report, Phase::UpdateQuestions, result);

        let result = self.delete_themes(draft, &plan).await;
        record(&mut report, Phase::DeleteThemes, result);

        let result = self.delete_questions(draft, &plan).await;
        record(&mut report, Phase::DeleteQuestions, result);

        if report.is_success() {
            log::info!("{}", report.headline());
        } else {
            log::warn!("Save finished with {} failed phase(s)", report.failures().count());
        }
        report
    }

    async fn insert_themes(
        &self,
        draft: &mut DraftStore,
        plan: &SyncPlan,
        id_map: &mut IdMap,
    ) -> PhaseResult {
        let pending: Vec<(LocalId, NewThemeRow)> = plan
            .new_themes
            .iter()
            .filter_map(|local_id| draft.theme(*local_id))
            .filter(|theme| theme.id.is_none())
            .map(|theme| (theme.local_id, NewThemeRow { name: theme.name.clone() }))
            .collect();
        if pending.is_empty() {
            return Ok(None);
        }

        let rows: Vec<NewThemeRow> = pending.iter().map(|(_, row)| row.clone()).collect();
        let inserted = self.store.insert_themes(&rows).await?;
        expect_row_count(pending.len(), inserted.len())?;

        for ((local_id, _), row) in pending.iter().zip(&inserted) {
            draft.confirm_theme_insert(*local_id, row.id);
            id_map.insert(*local_id, row.id);
        }
        let remapped = draft.resolve_orphans(|local_id| id_map.get(local_id));
        log::debug!(
            "Inserted {} themes, attached {} orphan questions",
            inserted.len(),
            remapped
        );
        Ok(Some(inserted.len()))
    }

    async fn update_themes(
        &self,
        draft: &mut DraftStore,
        plan: &SyncPlan,
        id_map: &mut IdMap,
    ) -> PhaseResult {
        let pending: Vec<(LocalId, RemoteId, ThemePatch)> = plan
            .changed_themes
            .iter()
            .filter_map(|local_id| draft.theme(*local_id))
            .filter_map(|theme| {
                theme
                    .id
                    .map(|id| (theme.local_id, id, ThemePatch { name: theme.name.clone() }))
            })
            .collect();
        if pending.is_empty() {
            return Ok(None);
        }

        let patches: Vec<(RemoteId, ThemePatch)> =
            pending.iter().map(|(_, id, patch)| (*id, patch.clone())).collect();
        let updated = self.store.update_themes(&patches).await?;

        let mut missing = Vec::new();
        for (local_id, id, _) in &pending {
            if updated.iter().any(|row| row.id == *id) {
                draft.mark_theme_clean(*local_id);
            } else {
                log::warn!("Topic {} no longer exists remotely; it will be saved as new", id);
                draft.requeue_theme(*local_id);
                id_map.remove(*local_id);
                missing.push(*id);
            }
        }
        missing_rows("topics", &missing)?;
        Ok(Some(pending.len()))
    }

    async fn insert_questions(
        &self,
        draft: &mut DraftStore,
        plan: &SyncPlan,
        id_map: &IdMap,
        report: &mut SyncReport,
    ) -> PhaseResult {
        draft.resolve_orphans(|local_id| id_map.get(local_id));

        let mut pending: Vec<(LocalId, NewQuestionRow)> = Vec::new();
        let mut deferred = 0;
        for question in plan
            .new_questions
            .iter()
            .filter_map(|local_id| draft.question(*local_id))
            .filter(|question| question.id.is_none())
        {
            match question.topic_id {
                Some(topic_id) => pending.push((
                    question.local_id,
                    NewQuestionRow {
                        topic_id,
                        question: question.question.clone(),
                    },
                )),
                None => deferred += 1,
            }
        }
        report.deferred_questions = deferred;
        if deferred > 0 {
            log::warn!("{} questions wait for their topic to be saved", deferred);
        }
        if pending.is_empty() {
            return Ok(None);
        }

        let rows: Vec<NewQuestionRow> = pending.iter().map(|(_, row)| row.clone()).collect();
        let inserted = self.store.insert_questions(&rows).await?;
        expect_row_count(pending.len(), inserted.len())?;

        for ((local_id, _), row) in pending.iter().zip(&inserted) {
            draft.confirm_question_insert(*local_id, row.id);
        }
        Ok(Some(inserted.len()))
    }

    async fn update_questions(&self, draft: &mut DraftStore, plan: &SyncPlan) -> PhaseResult {
        let pending: Vec<(LocalId, RemoteId, QuestionPatch)> = plan
            .updated_questions
            .iter()
            .filter_map(|local_id| draft.question(*local_id))
            .filter(|question| question.is_updated())
            .filter_map(|question| {
                question.id.map(|id| {
                    (
                        question.local_id,
                        id,
                        QuestionPatch { question: question.question.clone() },
                    )
                })
            })
            .collect();
        if pending.is_empty() {
            return Ok(None);
        }

        let patches: Vec<(RemoteId, QuestionPatch)> =
            pending.iter().map(|(_, id, patch)| (*id, patch.clone())).collect();
        let updated = self.store.update_questions(&patches).await?;

        let mut missing = Vec::new();
        for (local_id, id, _) in &pending {
            if updated.iter().any(|row| row.id == *id) {
                draft.mark_question_clean(*local_id);
            } else {
                log::warn!("Question {} no longer exists remotely; it will be saved as new", id);
                draft.requeue_question(*local_id);
                missing.push(*id);
            }
        }
        missing_rows("questions", &missing)?;
        Ok(Some(pending.len()))
    }

    async fn delete_themes(&self, draft: &mut DraftStore, plan: &SyncPlan) -> PhaseResult {
        if plan.deleted_theme_ids.is_empty() {
            return Ok(None);
        }
        self.store.delete_themes(&plan.deleted_theme_ids).await?;
        draft.forget_deleted_themes(&plan.deleted_theme_ids);
        Ok(Some(plan.deleted_theme_ids.len()))
    }

    async fn delete_questions(&self, draft: &mut DraftStore, plan: &SyncPlan) -> PhaseResult {
        if plan.deleted_question_ids.is_empty() {
            return Ok(None);
        }
        self.store.delete_questions(&plan.deleted_question_ids).await?;
        draft.forget_deleted_questions(&plan.deleted_question_ids);
        Ok(Some(plan.deleted_question_ids.len()))
    }
}

fn expect_row_count(sent: usize, returned: usize) -> DomainResult<()> {
    if sent != returned {
        return Err(DomainError::Internal(format!(
            "Remote store returned {} rows for {} inserted",
            returned, sent
        )));
    }
    Ok(())
}

/// Patched ids absent from the store's answer fail the phase
fn missing_rows(what: &str, missing: &[RemoteId]) -> DomainResult<()> {
    if missing.is_empty() {
        return Ok(());
    }
    let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
    Err(DomainError::NotFound(format!(
        "{} missing remotely: {}",
        what,
        ids.join(", ")
    )))
}

fn record(report: &mut SyncReport, phase: Phase, result: PhaseResult) {
    let status = match result {
        Ok(None) => PhaseStatus::Skipped,
        Ok(Some(affected)) => {
            log::debug!("Phase {} completed ({} rows)", phase, affected);
            PhaseStatus::Completed { affected }
        }
        Err(error) => {
            log::error!("{}: {}", phase.failure_message(), error);
            PhaseStatus::Failed { error }
        }
    };
    report.record(phase, status);
}
