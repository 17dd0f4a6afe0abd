//! Domain Layer - Core Entity Trait
//!
//! Every draft entity carries a synthetic local id, an optional remote id and an
//! edit state. The sync engine classifies records through this trait only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned by the remote store
pub type RemoteId = i64;

/// Identifier assigned by the draft when a record enters it.
///
/// Stable for the lifetime of the draft and independent of the remote id, so
/// parent references between unsaved records never need to be guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(pub(crate) u64);

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "local#{}", self.0)
    }
}

/// Edit state of a draft record relative to the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    /// Never persisted
    #[default]
    Unsynced,
    /// Persisted, edited locally since the last confirmed sync
    Dirty,
    /// Matches the remote store
    Clean,
}

impl EditState {
    /// State after a local edit: unsaved records stay unsaved
    pub fn edited(self) -> Self {
        match self {
            EditState::Unsynced => EditState::Unsynced,
            EditState::Dirty | EditState::Clean => EditState::Dirty,
        }
    }
}

/// Core trait for all draft entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// Draft-local identifier
    fn local_id(&self) -> LocalId;

    /// Remote identifier, `None` until persisted
    fn remote_id(&self) -> Option<RemoteId>;

    fn state(&self) -> EditState;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Remote store error: {0}")]
    Remote(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
