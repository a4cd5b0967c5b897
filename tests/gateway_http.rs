//! End-to-end: reqwest transport, gateway and refresh coordinator against an
//! in-process axum backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use boardsync::config::Timeouts;
use boardsync::{
    BoardClient, GatewayError, InMemoryNavigator, Navigator, ReqwestTransport, RollbackPolicy, TokenStore,
};
use futures::future::join_all;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Backend {
    refreshes: Arc<AtomicUsize>,
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    if body["refreshToken"] == "r1" {
        (StatusCode::OK, Json(json!({ "data": { "accessToken": "fresh", "refreshToken": "r2" } })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "invalid refresh token" })))
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer fresh")
}

async fn get_card(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if authorized(&headers) {
        (StatusCode::OK, Json(json!({ "data": { "id": id, "title": "Card", "orderIdx": 0 } })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" })))
    }
}

async fn delete_card(headers: HeaderMap) -> StatusCode {
    if authorized(&headers) { StatusCode::NO_CONTENT } else { StatusCode::UNAUTHORIZED }
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/auth/refresh", post(refresh))
        .route("/api/cards/{id}", get(get_card).delete(delete_card))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, refresh_token: &str) -> (BoardClient, Arc<InMemoryNavigator>) {
    let transport = Arc::new(ReqwestTransport::new(base_url, Timeouts::default()).unwrap());
    let tokens = TokenStore::in_memory();
    tokens.save_pair("stale", Some(refresh_token)).unwrap();
    let navigator = Arc::new(InMemoryNavigator::new("/boards/b1"));
    let client = BoardClient::with_transport(transport, tokens, navigator.clone(), "/login", RollbackPolicy::default());
    (client, navigator)
}

#[tokio::test]
async fn concurrent_expired_requests_share_one_refresh() {
    let backend = Backend::default();
    let base_url = spawn_backend(backend.clone()).await;
    let (client, _) = client(&base_url, "r1");

    let cards = join_all((0..4).map(|i| {
        let id = format!("c{i}");
        let client = &client;
        async move { client.get_card(&id).await }
    }))
    .await;

    assert!(cards.iter().all(Result::is_ok));
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(client.tokens().access_token().as_deref(), Some("fresh"));
    assert_eq!(client.tokens().refresh_token().as_deref(), Some("r2"));
}

#[tokio::test]
async fn rejected_refresh_clears_session_and_redirects() {
    let base_url = spawn_backend(Backend::default()).await;
    let (client, navigator) = client(&base_url, "revoked");

    let err = client.gateway().send(boardsync::api::get_card("c1")).await.unwrap_err();

    assert_eq!(err, GatewayError::AuthExpired);
    assert!(!client.tokens().is_authenticated());
    assert_eq!(navigator.current_route(), "/login");
}

#[tokio::test]
async fn no_content_after_refresh_is_null() {
    let base_url = spawn_backend(Backend::default()).await;
    let (client, _) = client(&base_url, "r1");

    let body = client.gateway().send(boardsync::api::delete_card("c1")).await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (client, _) = client(&format!("http://{addr}"), "r1");

    let err = client.gateway().send(boardsync::api::get_card("c1")).await.unwrap_err();

    assert_eq!(err.status(), 0);
    assert_eq!(err.envelope().status, 0);
}
