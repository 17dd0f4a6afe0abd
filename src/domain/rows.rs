//! Remote row shapes
//!
//! Records as the remote store sees them: `topics {id, name}` and
//! `topics-questions {id, topic_id, question}`.

use serde::{Deserialize, Deserializer, Serialize};
use super::entity::RemoteId;

/// Remote collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Themes,
    Questions,
}

impl Collection {
    /// Table name in the remote store
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Themes => "topics",
            Collection::Questions => "topics-questions",
        }
    }

    /// All readable columns
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Themes => &["id", "name"],
            Collection::Questions => &["id", "topic_id", "question"],
        }
    }

    /// Columns accepted on insert and update
    pub fn writable_columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Themes => &["name"],
            Collection::Questions => &["topic_id", "question"],
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Null or missing text reads as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted theme row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRow {
    pub id: RemoteId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

/// Theme row to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewThemeRow {
    pub name: String,
}

/// Theme fields to update by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePatch {
    pub name: String,
}

/// Persisted question row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub id: RemoteId,
    /// Nullable remotely; rows without a topic are never loaded
    #[serde(default)]
    pub topic_id: Option<RemoteId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub question: String,
}

/// Question row to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestionRow {
    pub topic_id: RemoteId,
    pub question: String,
}

/// Question fields to update by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPatch {
    pub question: String,
}
