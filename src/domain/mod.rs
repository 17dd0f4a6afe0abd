//! Domain Layer
//!
//! Contains the draft entities and core abstractions.
//! This layer has NO external dependencies (except serde and thiserror).

mod entity;
mod question;
mod rows;
mod theme;

pub use entity::{DomainError, DomainResult, EditState, Entity, LocalId, RemoteId};
pub use question::Question;
pub use rows::{
    Collection, NewQuestionRow, NewThemeRow, QuestionPatch, QuestionRow, ThemePatch, ThemeRow,
};
pub use theme::{Theme, ThemeField};
