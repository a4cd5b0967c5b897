//! Composition root.
//!
//! SYSTEM CONTEXT
//! ==============
//! `BoardClient` owns exactly one token store, one refresh coordinator, one
//! gateway and one board store, and hands the same instances to everything
//! it builds. Embedders construct one client per session; constructing two
//! would give each its own refresh coordinator and break single-flight.

use std::sync::{Arc, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::info;

use crate::api;
use crate::auth::AuthApi;
use crate::board::{BoardStateStore, Column, ColumnId, Comment, SharedBoard, Task};
use crate::config::ClientConfig;
use crate::error::{BoardError, GatewayError, MutationError};
use crate::mutation::{
    CardChanges, CreateCard, CreateComment, DeleteCard, DeleteComment, MoveCard, OptimisticMutationController,
    RollbackPolicy, UpdateCard, UpdateComment,
};
use crate::navigation::Navigator;
use crate::net::{HttpTransport, RefreshCoordinator, RequestGateway, ReqwestTransport, TransportError};
use crate::token::{FileStore, StoreError, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("unexpected response shape from {0}")]
    Shape(String),
}

impl ClientError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(e) => e.user_message(),
            Self::Mutation(e) => e.user_message(),
            _ => self.to_string(),
        }
    }
}

pub struct BoardClient {
    refresh: Arc<RefreshCoordinator>,
    gateway: Arc<RequestGateway>,
    mutations: OptimisticMutationController,
    auth: AuthApi,
}

impl BoardClient {
    /// Production wiring: reqwest transport and file-backed tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the token file
    /// exists but is unreadable.
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestTransport::new(&config.base_url, config.timeouts)?);
        let tokens = TokenStore::new(Arc::new(FileStore::open(&config.token_file)?));
        info!(base_url = %config.base_url, token_file = %config.token_file.display(), "client configured");
        Ok(Self::with_transport(transport, tokens, navigator, &config.login_route, config.rollback_policy))
    }

    #[must_use]
    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        login_route: &str,
        policy: RollbackPolicy,
    ) -> Self {
        let refresh = Arc::new(RefreshCoordinator::new(transport.clone(), tokens.clone(), navigator, login_route));
        let gateway = Arc::new(RequestGateway::new(transport, tokens, refresh.clone()));
        let board = BoardStateStore::new().shared();
        let mutations = OptimisticMutationController::new(board, gateway.clone(), policy);
        let auth = AuthApi::new(gateway.clone());
        Self { refresh, gateway, mutations, auth }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.gateway.tokens()
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    #[must_use]
    pub fn refresh(&self) -> &Arc<RefreshCoordinator> {
        &self.refresh
    }

    #[must_use]
    pub fn board(&self) -> &SharedBoard {
        self.mutations.board()
    }

    #[must_use]
    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    #[must_use]
    pub fn mutations(&self) -> &OptimisticMutationController {
        &self.mutations
    }

    // =========================================================================
    // LOADS
    // =========================================================================

    /// Fetch a board's columns with their cards and replace local state.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the body holds no lists.
    pub async fn load_board(&self, board_id: &str) -> Result<Vec<Column>, ClientError> {
        let request = api::board_lists(board_id);
        let path = request.path.clone();
        let body = self.gateway.send(request).await?;
        let columns = api::decode_many::<Column>(&body, "lists").ok_or(ClientError::Shape(path))?;
        let mut board = self.lock();
        board.load(columns);
        info!(board_id, columns = board.columns().len(), "board loaded");
        Ok(board.columns().to_vec())
    }

    /// Fetch a card's comment thread into local state.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the body holds no comments.
    pub async fn load_comments(&self, card_id: &str) -> Result<Vec<Comment>, ClientError> {
        let request = api::list_comments(card_id);
        let path = request.path.clone();
        let body = self.gateway.send(request).await?;
        let comments = api::decode_many::<Comment>(&body, "comments").ok_or(ClientError::Shape(path))?;
        self.lock().load_comments(card_id, comments.clone());
        Ok(comments)
    }

    /// Read one card straight from the server. Local state is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the body is not a card.
    pub async fn get_card(&self, card_id: &str) -> Result<Task, ClientError> {
        Ok(self.gateway.fetch(api::get_card(card_id)).await?)
    }

    // =========================================================================
    // CARD MUTATIONS
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the column is unknown locally or the server
    /// refuses; local state is rolled back in the latter case.
    pub async fn create_card(&self, column_id: &str, title: &str, description: Option<String>) -> Result<Value, ClientError> {
        Ok(self.mutations.perform(&CreateCard::new(column_id, title, description)).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the card is unknown locally or the server refuses.
    pub async fn move_card(&self, card_id: &str, to_column_id: &str, new_index: usize) -> Result<Value, ClientError> {
        let from = self.column_of(card_id)?;
        Ok(self.mutations.perform(&MoveCard::new(card_id, from, to_column_id, new_index)).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the card is unknown locally or the server refuses.
    pub async fn update_card(&self, card_id: &str, changes: CardChanges) -> Result<Value, ClientError> {
        let column = self.column_of(card_id)?;
        Ok(self.mutations.perform(&UpdateCard::new(card_id, column, changes)).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the card is unknown locally or the server refuses.
    pub async fn delete_card(&self, card_id: &str) -> Result<Value, ClientError> {
        let column = self.column_of(card_id)?;
        Ok(self.mutations.perform(&DeleteCard::new(card_id, column)).await?)
    }

    // =========================================================================
    // COMMENT MUTATIONS
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the server refuses.
    pub async fn create_comment(&self, card_id: &str, content: &str) -> Result<Value, ClientError> {
        Ok(self.mutations.perform(&CreateComment::new(card_id, content)).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the comment is not loaded or the server refuses.
    pub async fn update_comment(&self, card_id: &str, comment_id: &str, content: &str) -> Result<Value, ClientError> {
        Ok(self.mutations.perform(&UpdateComment::new(card_id, comment_id, content)).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the comment is not loaded or the server refuses.
    pub async fn delete_comment(&self, card_id: &str, comment_id: &str) -> Result<Value, ClientError> {
        Ok(self.mutations.perform(&DeleteComment::new(card_id, comment_id)).await?)
    }

    fn column_of(&self, card_id: &str) -> Result<ColumnId, ClientError> {
        self.lock()
            .find_task(card_id)
            .map(|(column, _)| column.id.clone())
            .ok_or_else(|| BoardError::UnknownTask(card_id.to_owned()).into())
    }

    fn lock(&self) -> MutexGuard<'_, BoardStateStore> {
        self.board().lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
