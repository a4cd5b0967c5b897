//! Shared fixtures for unit tests: a scripted transport and a wired-up
//! gateway over in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::board::{BoardStateStore, Column, SharedBoard, Task};
use crate::navigation::InMemoryNavigator;
use crate::net::{ApiRequest, HttpResponse, HttpTransport, RefreshCoordinator, RequestGateway, TransportError};
use crate::token::TokenStore;

pub(crate) const LOGIN_ROUTE: &str = "/login";
pub(crate) const START_ROUTE: &str = "/boards/1";

/// Scripted outcome for one exchange.
pub(crate) enum Reply {
    Json(u16, Value),
    Empty(u16),
    Raw(u16, &'static str),
    Fail(&'static str),
}

type Handler = Box<dyn Fn(&ApiRequest) -> Reply + Send + Sync>;

/// Transport answering from a closure, recording every request it sees.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(handler: impl Fn(&ApiRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), delays: HashMap::new(), calls: Mutex::new(Vec::new()) }
    }

    /// Delay responses for `path` (the delay starts after the call is recorded).
    pub(crate) fn with_delay(mut self, path: &str, millis: u64) -> Self {
        self.delays.insert(path.to_owned(), Duration::from_millis(millis));
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn count(&self, method: &Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| &c.method == method && c.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<HttpResponse, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        if let Some(delay) = self.delays.get(&request.path) {
            tokio::time::sleep(*delay).await;
        }
        match (self.handler)(request) {
            Reply::Json(status, body) => Ok(HttpResponse { status, body: body.to_string() }),
            Reply::Empty(status) => Ok(HttpResponse { status, body: String::new() }),
            Reply::Raw(status, body) => Ok(HttpResponse { status, body: body.to_owned() }),
            Reply::Fail(message) => Err(TransportError(message.to_owned())),
        }
    }
}

/// Bearer token a request was sent with, if any.
pub(crate) fn bearer(request: &ApiRequest) -> Option<&str> {
    request.header("Authorization")?.strip_prefix("Bearer ")
}

/// Gateway, coordinator and collaborators sharing one scripted transport.
pub(crate) struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub tokens: TokenStore,
    pub navigator: Arc<InMemoryNavigator>,
    pub refresh: Arc<RefreshCoordinator>,
    pub gateway: Arc<RequestGateway>,
}

/// Harness logged in with access token `stale` and refresh token `r1`.
pub(crate) fn harness(transport: ScriptedTransport) -> Harness {
    let tokens = TokenStore::in_memory();
    tokens
        .save_pair("stale", Some("r1"))
        .expect("memory store accepts writes");
    harness_with_tokens(transport, tokens)
}

pub(crate) fn harness_with_tokens(transport: ScriptedTransport, tokens: TokenStore) -> Harness {
    let transport = Arc::new(transport);
    let navigator = Arc::new(InMemoryNavigator::new(START_ROUTE));
    let refresh = Arc::new(RefreshCoordinator::new(
        transport.clone(),
        tokens.clone(),
        navigator.clone(),
        LOGIN_ROUTE,
    ));
    let gateway = Arc::new(RequestGateway::new(transport.clone(), tokens.clone(), refresh.clone()));
    Harness { transport, tokens, navigator, refresh, gateway }
}

pub(crate) fn task(id: &str, order_idx: i64) -> Task {
    Task::new(id, id.to_uppercase(), order_idx)
}

/// Board with `A:[t1, t2]` and an empty `B`.
pub(crate) fn two_column_board() -> SharedBoard {
    let mut board = BoardStateStore::new();
    board.load(vec![
        Column::new("A", "Todo", 0, vec![task("t1", 0), task("t2", 1)]),
        Column::new("B", "Doing", 1, vec![]),
    ]);
    board.shared()
}

pub(crate) fn column_ids(board: &SharedBoard, column_id: &str) -> Vec<String> {
    board
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .column(column_id)
        .map(|c| c.tasks.iter().map(|t| t.id.clone()).collect())
        .unwrap_or_default()
}
