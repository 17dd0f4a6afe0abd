//! Save Report
//!
//! Per-phase outcome of one save plus the messages shown to the operator.

use serde::Serialize;

use crate::domain::DomainError;

/// Shown while a save runs
pub const SAVING_MESSAGE: &str = "Saving changes...";
/// Shown when every phase succeeded
pub const SUCCESS_MESSAGE: &str = "Changes saved successfully!";

/// Save phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InsertThemes,
    UpdateThemes,
    InsertQuestions,
    UpdateQuestions,
    DeleteThemes,
    DeleteQuestions,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::InsertThemes,
        Phase::UpdateThemes,
        Phase::InsertQuestions,
        Phase::UpdateQuestions,
        Phase::DeleteThemes,
        Phase::DeleteQuestions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::InsertThemes => "insert themes",
            Phase::UpdateThemes => "update themes",
            Phase::InsertQuestions => "insert questions",
            Phase::UpdateQuestions => "update questions",
            Phase::DeleteThemes => "delete themes",
            Phase::DeleteQuestions => "delete questions",
        }
    }

    /// Operator-facing message when the phase fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Phase::InsertThemes => "Failed to save new topics",
            Phase::UpdateThemes => "Failed to update topics",
            Phase::InsertQuestions => "Failed to insert questions",
            Phase::UpdateQuestions => "Failed to update questions",
            Phase::DeleteThemes => "Failed to delete topics",
            Phase::DeleteQuestions => "Failed to delete questions",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Nothing to send
    Skipped,
    Completed { affected: usize },
    Failed { error: DomainError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseOutcome {
    pub phase: Phase,
    #[serde(flatten)]
    pub status: PhaseStatus,
}

/// Result of one save
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<PhaseOutcome>,
    /// New questions left for a later save because their theme has no remote id
    pub deferred_questions: usize,
}

impl SyncReport {
    pub(crate) fn record(&mut self, phase: Phase, status: PhaseStatus) {
        self.outcomes.push(PhaseOutcome { phase, status });
    }

    /// No phase failed
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PhaseOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, PhaseStatus::Failed { .. }))
    }

    pub fn outcome(&self, phase: Phase) -> Option<&PhaseStatus> {
        self.outcomes.iter().find(|o| o.phase == phase).map(|o| &o.status)
    }

    /// One message per failed phase, or the success message
    pub fn messages(&self) -> Vec<&'static str> {
        let failed: Vec<_> = self.failures().map(|o| o.phase.failure_message()).collect();
        if failed.is_empty() {
            vec![SUCCESS_MESSAGE]
        } else {
            failed
        }
    }

    /// The last message the operator sees
    pub fn headline(&self) -> &'static str {
        self.messages().last().copied().unwrap_or(SUCCESS_MESSAGE)
    }
}
