use reqwest::Method;
use serde_json::json;

use super::*;
use crate::api::{LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
use crate::test_helpers::{Reply, ScriptedTransport, harness, harness_with_tokens};

#[tokio::test]
async fn login_stores_issued_pair() {
    let h = harness_with_tokens(
        ScriptedTransport::new(|_| Reply::Json(200, json!({ "data": { "accessToken": "a1", "refreshToken": "r9", "user": { "id": "u1" } } }))),
        TokenStore::in_memory(),
    );
    let auth = AuthApi::new(h.gateway.clone());

    let body = auth.login("ann@example.com", "pw").await.unwrap();

    assert_eq!(body["data"]["user"]["id"], "u1");
    assert_eq!(h.tokens.access_token().as_deref(), Some("a1"));
    assert_eq!(h.tokens.refresh_token().as_deref(), Some("r9"));
    assert!(auth.is_authenticated());
    assert_eq!(h.transport.calls()[0].body, Some(json!({ "email": "ann@example.com", "password": "pw" })));
}

#[tokio::test]
async fn login_without_refresh_token_drops_previous_one() {
    let h = harness(ScriptedTransport::new(|_| Reply::Json(200, json!({ "token": "a2" }))));
    AuthApi::new(h.gateway.clone()).login("a@b.c", "pw").await.unwrap();
    assert_eq!(h.tokens.access_token().as_deref(), Some("a2"));
    assert!(h.tokens.refresh_token().is_none());
}

#[tokio::test]
async fn bad_credentials_surface_server_message_without_refresh() {
    let h = harness(ScriptedTransport::new(|_| Reply::Json(401, json!({ "message": "Invalid email or password" }))));
    let err = AuthApi::new(h.gateway.clone()).login("a@b.c", "bad").await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(h.transport.count(&Method::POST, REFRESH_PATH), 0);
    assert_eq!(h.transport.count(&Method::POST, LOGIN_PATH), 1);
}

#[tokio::test]
async fn register_requires_access_token_in_body() {
    let h = harness_with_tokens(ScriptedTransport::new(|_| Reply::Json(201, json!({ "user": {} }))), TokenStore::in_memory());
    let err = AuthApi::new(h.gateway.clone()).register("Ann", "a@b.c", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
    assert!(!h.tokens.is_authenticated());
}

#[tokio::test]
async fn logout_clears_tokens_even_when_server_fails() {
    let h = harness(ScriptedTransport::new(|_| Reply::Fail("connection refused")));
    AuthApi::new(h.gateway.clone()).logout().await.unwrap();

    assert!(!h.tokens.is_authenticated());
    assert!(h.tokens.refresh_token().is_none());
    let call = &h.transport.calls()[0];
    assert_eq!(call.path, LOGOUT_PATH);
    assert_eq!(call.body, Some(json!({ "refreshToken": "r1" })));
}
