//! Board records as exchanged with the backend.
//!
//! Only identity, ordering and membership are modelled explicitly; any other
//! server fields ride along in `extra` so a round trip does not drop them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub type ColumnId = String;
pub type TaskId = String;
pub type CommentId = String;

const PLACEHOLDER_PREFIX: &str = "temp-";

fn placeholder_id() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4())
}

/// A card. Its column is implied by which [`Column`] holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Per-column sort key.
    #[serde(default)]
    pub order_idx: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    #[must_use]
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, order_idx: i64) -> Self {
        Self { id: id.into(), title: title.into(), description: None, order_idx, extra: Map::new() }
    }

    /// Locally created card awaiting a server id.
    #[must_use]
    pub fn placeholder(title: impl Into<String>, description: Option<String>) -> Self {
        Self { description, ..Self::new(placeholder_id(), title, 0) }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }
}

/// A list on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub order_idx: i64,
    #[serde(default, alias = "cards")]
    pub tasks: Vec<Task>,
}

impl Column {
    #[must_use]
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>, order_idx: i64, tasks: Vec<Task>) -> Self {
        Self { id: id.into(), title: title.into(), order_idx, tasks }
    }

    #[must_use]
    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }
}

/// A comment on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub card_id: TaskId,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    #[must_use]
    pub fn new(id: impl Into<CommentId>, card_id: impl Into<TaskId>, content: impl Into<String>) -> Self {
        Self { id: id.into(), card_id: card_id.into(), content: content.into(), extra: Map::new() }
    }

    #[must_use]
    pub fn placeholder(card_id: impl Into<TaskId>, content: impl Into<String>) -> Self {
        Self::new(placeholder_id(), card_id, content)
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
