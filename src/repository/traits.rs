//! Repository Layer - Core Traits
//!
//! Defines the remote store contract the sync engine talks to.
//! Implementations can use SQLite, a PostgREST endpoint, etc.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    Collection, DomainError, DomainResult, NewQuestionRow, NewThemeRow, QuestionPatch,
    QuestionRow, RemoteId, ThemePatch, ThemeRow,
};

/// One record as a JSON object keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Batched remote store operations on a named collection
///
/// All operations are async to support various backends.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the given columns of every row (all columns when `columns` is empty)
    async fn select(&self, collection: Collection, columns: &[&str]) -> DomainResult<Vec<Row>>;

    /// Insert rows; returns them with assigned ids, in request order
    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> DomainResult<Vec<Row>>;

    /// Apply one patch per id; returns the rows that were updated
    async fn update(
        &self,
        collection: Collection,
        patches: Vec<(RemoteId, Row)>,
    ) -> DomainResult<Vec<Row>>;

    /// Delete every row whose id is in `ids`
    async fn delete_by_ids(&self, collection: Collection, ids: &[RemoteId]) -> DomainResult<()>;
}

/// Typed catalog operations on top of any [`RemoteStore`]
#[async_trait]
pub trait CatalogOperations {
    async fn fetch_themes(&self) -> DomainResult<Vec<ThemeRow>>;

    async fn fetch_questions(&self) -> DomainResult<Vec<QuestionRow>>;

    async fn insert_themes(&self, rows: &[NewThemeRow]) -> DomainResult<Vec<ThemeRow>>;

    async fn update_themes(&self, patches: &[(RemoteId, ThemePatch)]) -> DomainResult<Vec<ThemeRow>>;

    async fn insert_questions(&self, rows: &[NewQuestionRow]) -> DomainResult<Vec<QuestionRow>>;

    async fn update_questions(
        &self,
        patches: &[(RemoteId, QuestionPatch)],
    ) -> DomainResult<Vec<QuestionRow>>;

    async fn delete_themes(&self, ids: &[RemoteId]) -> DomainResult<()>;

    async fn delete_questions(&self, ids: &[RemoteId]) -> DomainResult<()>;
}

#[async_trait]
impl<S: RemoteStore + ?Sized> CatalogOperations for S {
    async fn fetch_themes(&self) -> DomainResult<Vec<ThemeRow>> {
        let rows = self.select(Collection::Themes, Collection::Themes.columns()).await?;
        decode_rows(rows)
    }

    async fn fetch_questions(&self) -> DomainResult<Vec<QuestionRow>> {
        let rows = self.select(Collection::Questions, Collection::Questions.columns()).await?;
        decode_rows(rows)
    }

    async fn insert_themes(&self, rows: &[NewThemeRow]) -> DomainResult<Vec<ThemeRow>> {
        let rows = encode_rows(rows)?;
        decode_rows(self.insert(Collection::Themes, rows).await?)
    }

    async fn update_themes(&self, patches: &[(RemoteId, ThemePatch)]) -> DomainResult<Vec<ThemeRow>> {
        let patches = encode_patches(patches)?;
        decode_rows(self.update(Collection::Themes, patches).await?)
    }

    async fn insert_questions(&self, rows: &[NewQuestionRow]) -> DomainResult<Vec<QuestionRow>> {
        let rows = encode_rows(rows)?;
        decode_rows(self.insert(Collection::Questions, rows).await?)
    }

    async fn update_questions(
        &self,
        patches: &[(RemoteId, QuestionPatch)],
    ) -> DomainResult<Vec<QuestionRow>> {
        let patches = encode_patches(patches)?;
        decode_rows(self.update(Collection::Questions, patches).await?)
    }

    async fn delete_themes(&self, ids: &[RemoteId]) -> DomainResult<()> {
        self.delete_by_ids(Collection::Themes, ids).await
    }

    async fn delete_questions(&self, ids: &[RemoteId]) -> DomainResult<()> {
        self.delete_by_ids(Collection::Questions, ids).await
    }
}

/// Serialize a record into a column map
pub fn encode_row<T: Serialize>(value: &T) -> DomainResult<Row> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(DomainError::Internal(format!("Expected a JSON object, got {}", other))),
    }
}

fn encode_rows<T: Serialize>(values: &[T]) -> DomainResult<Vec<Row>> {
    values.iter().map(encode_row).collect()
}

fn encode_patches<T: Serialize>(patches: &[(RemoteId, T)]) -> DomainResult<Vec<(RemoteId, Row)>> {
    patches
        .iter()
        .map(|(id, patch)| Ok((*id, encode_row(patch)?)))
        .collect()
}

/// Deserialize column maps into records
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> DomainResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(serde_json::Value::Object(row)).map_err(DomainError::from))
        .collect()
}
