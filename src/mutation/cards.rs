//! Card mutations: create, move, update, delete.

use serde_json::{Map, Value};
use tracing::debug;

use super::Mutation;
use crate::api;
use crate::board::{BoardStateStore, ColumnId, Region, Task, TaskId};
use crate::error::BoardError;
use crate::net::ApiRequest;

/// Adopt a server copy of a card, keeping the local `order_idx` when the
/// server's value would duplicate another card's key in the column.
fn adopt_server_card(board: &mut BoardStateStore, column_id: &str, mut server: Task, local_order: i64) -> Result<(), BoardError> {
    let collides = board.column(column_id).is_some_and(|column| {
        column
            .tasks
            .iter()
            .any(|t| t.id != server.id && t.order_idx == server.order_idx)
    });
    if collides {
        debug!(card_id = %server.id, server_order = server.order_idx, "server order collides locally; keeping local order");
        server.order_idx = local_order;
    }
    board.upsert_task(column_id, server)
}

// =============================================================================
// CREATE
// =============================================================================

/// Add a card to a column. A placeholder with a temporary id is shown until
/// the server returns the real card.
#[derive(Debug, Clone)]
pub struct CreateCard {
    column_id: ColumnId,
    placeholder: Task,
}

impl CreateCard {
    #[must_use]
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>, description: Option<String>) -> Self {
        Self { column_id: column_id.into(), placeholder: Task::placeholder(title, description) }
    }

    #[must_use]
    pub fn placeholder_id(&self) -> &str {
        &self.placeholder.id
    }
}

impl Mutation for CreateCard {
    fn kind(&self) -> &'static str {
        "card.create"
    }

    fn region(&self) -> Region {
        Region::Columns(vec![self.column_id.clone()])
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        let order_idx = board.next_order_idx(&self.column_id)?;
        board.upsert_task(&self.column_id, Task { order_idx, ..self.placeholder.clone() })
    }

    fn request(&self) -> ApiRequest {
        api::create_card(&self.column_id, &self.placeholder.title, self.placeholder.description.as_deref())
    }

    fn reconcile(&self, board: &mut BoardStateStore, body: &Value) -> Result<(), BoardError> {
        let Some(server) = api::decode_one::<Task>(body) else {
            debug!(placeholder = %self.placeholder.id, "create response carried no card; keeping placeholder");
            return Ok(());
        };
        let local = match board.find_task(&self.placeholder.id).map(|(_, t)| t.order_idx) {
            Some(order_idx) => {
                board.remove_task(&self.column_id, &self.placeholder.id)?;
                order_idx
            }
            None => {
                debug!(placeholder = %self.placeholder.id, card_id = %server.id, "placeholder already rolled back; appending confirmed card");
                board.next_order_idx(&self.column_id)?
            }
        };
        adopt_server_card(board, &self.column_id, server, local)
    }
}

// =============================================================================
// MOVE
// =============================================================================

/// Move a card to `new_index` of a column (possibly its own).
#[derive(Debug, Clone)]
pub struct MoveCard {
    card_id: TaskId,
    from_column_id: ColumnId,
    to_column_id: ColumnId,
    new_index: usize,
}

impl MoveCard {
    #[must_use]
    pub fn new(card_id: impl Into<TaskId>, from_column_id: impl Into<ColumnId>, to_column_id: impl Into<ColumnId>, new_index: usize) -> Self {
        Self {
            card_id: card_id.into(),
            from_column_id: from_column_id.into(),
            to_column_id: to_column_id.into(),
            new_index,
        }
    }
}

impl Mutation for MoveCard {
    fn kind(&self) -> &'static str {
        "card.move"
    }

    fn region(&self) -> Region {
        let mut columns = vec![self.from_column_id.clone()];
        if self.to_column_id != self.from_column_id {
            columns.push(self.to_column_id.clone());
        }
        Region::Columns(columns)
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        board.move_task(&self.card_id, &self.from_column_id, &self.to_column_id, self.new_index)
    }

    fn request(&self) -> ApiRequest {
        api::move_card(&self.card_id, &self.to_column_id, self.new_index)
    }

    fn reconcile(&self, board: &mut BoardStateStore, body: &Value) -> Result<(), BoardError> {
        let Some(server) = api::decode_one::<Task>(body).filter(|t| t.id == self.card_id) else {
            return Ok(());
        };
        let local = board
            .find_task(&self.card_id)
            .map(|(_, t)| t.order_idx)
            .ok_or_else(|| BoardError::UnknownTask(self.card_id.clone()))?;
        adopt_server_card(board, &self.to_column_id, server, local)
    }
}

// =============================================================================
// UPDATE
// =============================================================================

/// Field edits for a card. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CardChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".to_owned(), Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            body.insert("description".to_owned(), Value::String(description.clone()));
        }
        Value::Object(body)
    }

    fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCard {
    card_id: TaskId,
    column_id: ColumnId,
    changes: CardChanges,
}

impl UpdateCard {
    #[must_use]
    pub fn new(card_id: impl Into<TaskId>, column_id: impl Into<ColumnId>, changes: CardChanges) -> Self {
        Self { card_id: card_id.into(), column_id: column_id.into(), changes }
    }
}

impl Mutation for UpdateCard {
    fn kind(&self) -> &'static str {
        "card.update"
    }

    fn region(&self) -> Region {
        Region::Columns(vec![self.column_id.clone()])
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        let mut task = board
            .column(&self.column_id)
            .ok_or_else(|| BoardError::UnknownColumn(self.column_id.clone()))?
            .tasks
            .iter()
            .find(|t| t.id == self.card_id)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTask(self.card_id.clone()))?;
        self.changes.apply_to(&mut task);
        board.upsert_task(&self.column_id, task)
    }

    fn request(&self) -> ApiRequest {
        api::update_card(&self.card_id, self.changes.to_body())
    }

    fn reconcile(&self, board: &mut BoardStateStore, body: &Value) -> Result<(), BoardError> {
        let Some(server) = api::decode_one::<Task>(body).filter(|t| t.id == self.card_id) else {
            return Ok(());
        };
        let local = board
            .find_task(&self.card_id)
            .map(|(_, t)| t.order_idx)
            .ok_or_else(|| BoardError::UnknownTask(self.card_id.clone()))?;
        adopt_server_card(board, &self.column_id, server, local)
    }
}

// =============================================================================
// DELETE
// =============================================================================

#[derive(Debug, Clone)]
pub struct DeleteCard {
    card_id: TaskId,
    column_id: ColumnId,
}

impl DeleteCard {
    #[must_use]
    pub fn new(card_id: impl Into<TaskId>, column_id: impl Into<ColumnId>) -> Self {
        Self { card_id: card_id.into(), column_id: column_id.into() }
    }
}

impl Mutation for DeleteCard {
    fn kind(&self) -> &'static str {
        "card.delete"
    }

    fn region(&self) -> Region {
        Region::Columns(vec![self.column_id.clone()])
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        board.remove_task(&self.column_id, &self.card_id).map(drop)
    }

    fn request(&self) -> ApiRequest {
        api::delete_card(&self.card_id)
    }
}

#[cfg(test)]
#[path = "cards_test.rs"]
mod tests;
