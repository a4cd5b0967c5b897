//! Comment mutations. Each touches one card's comment thread.

use serde_json::Value;
use tracing::debug;

use super::Mutation;
use crate::api;
use crate::board::{BoardStateStore, Comment, CommentId, Region, TaskId};
use crate::error::BoardError;
use crate::net::ApiRequest;

fn server_comment(body: &Value, card_id: &str) -> Option<Comment> {
    let mut comment = api::decode_one::<Comment>(body)?;
    if comment.card_id.is_empty() {
        card_id.clone_into(&mut comment.card_id);
    }
    Some(comment)
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    card_id: TaskId,
    placeholder: Comment,
}

impl CreateComment {
    #[must_use]
    pub fn new(card_id: impl Into<TaskId>, content: impl Into<String>) -> Self {
        let card_id = card_id.into();
        let placeholder = Comment::placeholder(card_id.clone(), content);
        Self { card_id, placeholder }
    }

    #[must_use]
    pub fn placeholder_id(&self) -> &str {
        &self.placeholder.id
    }
}

impl Mutation for CreateComment {
    fn kind(&self) -> &'static str {
        "comment.create"
    }

    fn region(&self) -> Region {
        Region::Comments(self.card_id.clone())
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        board.upsert_comment(&self.card_id, self.placeholder.clone());
        Ok(())
    }

    fn request(&self) -> ApiRequest {
        api::create_comment(&self.card_id, &self.placeholder.content)
    }

    fn reconcile(&self, board: &mut BoardStateStore, body: &Value) -> Result<(), BoardError> {
        let Some(comment) = server_comment(body, &self.card_id) else {
            return Ok(());
        };
        if board.comments(&self.card_id).iter().any(|c| c.id == self.placeholder.id) {
            board.replace_comment(&self.card_id, &self.placeholder.id, comment)
        } else {
            debug!(placeholder = %self.placeholder.id, comment_id = %comment.id, "placeholder already rolled back; appending confirmed comment");
            board.upsert_comment(&self.card_id, comment);
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateComment {
    card_id: TaskId,
    comment_id: CommentId,
    content: String,
}

impl UpdateComment {
    #[must_use]
    pub fn new(card_id: impl Into<TaskId>, comment_id: impl Into<CommentId>, content: impl Into<String>) -> Self {
        Self { card_id: card_id.into(), comment_id: comment_id.into(), content: content.into() }
    }
}

impl Mutation for UpdateComment {
    fn kind(&self) -> &'static str {
        "comment.update"
    }

    fn region(&self) -> Region {
        Region::Comments(self.card_id.clone())
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        let mut comment = board
            .comments(&self.card_id)
            .iter()
            .find(|c| c.id == self.comment_id)
            .cloned()
            .ok_or_else(|| BoardError::UnknownComment(self.comment_id.clone()))?;
        comment.content.clone_from(&self.content);
        board.replace_comment(&self.card_id, &self.comment_id, comment)
    }

    fn request(&self) -> ApiRequest {
        api::update_comment(&self.comment_id, &self.content)
    }

    fn reconcile(&self, board: &mut BoardStateStore, body: &Value) -> Result<(), BoardError> {
        match server_comment(body, &self.card_id).filter(|c| c.id == self.comment_id) {
            Some(comment) => board.replace_comment(&self.card_id, &self.comment_id, comment),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeleteComment {
    card_id: TaskId,
    comment_id: CommentId,
}

impl DeleteComment {
    #[must_use]
    pub fn new(card_id: impl Into<TaskId>, comment_id: impl Into<CommentId>) -> Self {
        Self { card_id: card_id.into(), comment_id: comment_id.into() }
    }
}

impl Mutation for DeleteComment {
    fn kind(&self) -> &'static str {
        "comment.delete"
    }

    fn region(&self) -> Region {
        Region::Comments(self.card_id.clone())
    }

    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError> {
        board.remove_comment(&self.card_id, &self.comment_id).map(drop)
    }

    fn request(&self) -> ApiRequest {
        api::delete_comment(&self.comment_id)
    }
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod tests;
