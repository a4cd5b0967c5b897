//! REST endpoint catalog.
//!
//! Every backend call is built here so paths and body shapes live in one
//! place. Builders return an [`ApiRequest`]; sending is the gateway's job.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::net::ApiRequest;

pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const CARDS_PATH: &str = "/api/cards";

// =============================================================================
// AUTH
// =============================================================================

#[must_use]
pub fn refresh(refresh_token: &str) -> ApiRequest {
    ApiRequest::post(REFRESH_PATH).with_body(json!({ "refreshToken": refresh_token }))
}

#[must_use]
pub fn login(email: &str, password: &str) -> ApiRequest {
    ApiRequest::post(LOGIN_PATH)
        .with_body(json!({ "email": email, "password": password }))
        .without_refresh()
}

#[must_use]
pub fn register(name: &str, email: &str, password: &str) -> ApiRequest {
    ApiRequest::post(REGISTER_PATH)
        .with_body(json!({ "name": name, "email": email, "password": password }))
        .without_refresh()
}

#[must_use]
pub fn logout(refresh_token: Option<&str>) -> ApiRequest {
    let request = ApiRequest::post(LOGOUT_PATH).without_refresh();
    match refresh_token {
        Some(token) => request.with_body(json!({ "refreshToken": token })),
        None => request,
    }
}

// =============================================================================
// BOARDS / LISTS
// =============================================================================

fn board_lists_endpoint(board_id: &str) -> String {
    format!("/api/boards/{board_id}/lists")
}

fn list_cards_endpoint(list_id: &str) -> String {
    format!("/api/lists/{list_id}/cards")
}

/// Columns of a board, each with its cards.
#[must_use]
pub fn board_lists(board_id: &str) -> ApiRequest {
    ApiRequest::get(board_lists_endpoint(board_id))
}

/// Cards of one list; used to re-fetch a column after an unsafe rollback.
#[must_use]
pub fn list_cards(list_id: &str) -> ApiRequest {
    ApiRequest::get(list_cards_endpoint(list_id))
}

// =============================================================================
// CARDS
// =============================================================================

fn card_endpoint(card_id: &str) -> String {
    format!("{CARDS_PATH}/{card_id}")
}

fn card_move_endpoint(card_id: &str) -> String {
    format!("{CARDS_PATH}/{card_id}/move")
}

#[must_use]
pub fn create_card(list_id: &str, title: &str, description: Option<&str>) -> ApiRequest {
    let mut body = Map::new();
    body.insert("listId".to_owned(), Value::String(list_id.to_owned()));
    body.insert("title".to_owned(), Value::String(title.to_owned()));
    if let Some(description) = description {
        body.insert("description".to_owned(), Value::String(description.to_owned()));
    }
    ApiRequest::post(CARDS_PATH).with_body(Value::Object(body))
}

#[must_use]
pub fn get_card(card_id: &str) -> ApiRequest {
    ApiRequest::get(card_endpoint(card_id))
}

#[must_use]
pub fn update_card(card_id: &str, changes: Value) -> ApiRequest {
    ApiRequest::patch(card_endpoint(card_id)).with_body(changes)
}

#[must_use]
pub fn delete_card(card_id: &str) -> ApiRequest {
    ApiRequest::delete(card_endpoint(card_id))
}

#[must_use]
pub fn move_card(card_id: &str, to_list_id: &str, to_index: usize) -> ApiRequest {
    ApiRequest::post(card_move_endpoint(card_id)).with_body(json!({ "toListId": to_list_id, "toIndex": to_index }))
}

// =============================================================================
// COMMENTS
// =============================================================================

fn card_comments_endpoint(card_id: &str) -> String {
    format!("/api/comments/{card_id}")
}

fn comment_endpoint(comment_id: &str) -> String {
    format!("/api/comments/{comment_id}")
}

#[must_use]
pub fn list_comments(card_id: &str) -> ApiRequest {
    ApiRequest::get(card_comments_endpoint(card_id))
}

#[must_use]
pub fn create_comment(card_id: &str, content: &str) -> ApiRequest {
    ApiRequest::post(card_comments_endpoint(card_id)).with_body(json!({ "content": content }))
}

#[must_use]
pub fn update_comment(comment_id: &str, content: &str) -> ApiRequest {
    ApiRequest::patch(comment_endpoint(comment_id)).with_body(json!({ "content": content }))
}

#[must_use]
pub fn delete_comment(comment_id: &str) -> ApiRequest {
    ApiRequest::delete(comment_endpoint(comment_id))
}

// =============================================================================
// RESPONSE SHAPES
// =============================================================================

/// Unwrap a `{ "data": ... }` envelope when present.
#[must_use]
pub fn payload(body: &Value) -> &Value {
    match body.get("data") {
        Some(data) if !data.is_null() => data,
        _ => body,
    }
}

/// Decode a single record from a possibly wrapped body.
#[must_use]
pub fn decode_one<T: DeserializeOwned>(body: &Value) -> Option<T> {
    serde_json::from_value(payload(body).clone()).ok()
}

/// Decode a collection that is either a bare array or an object holding the
/// array under `key` (both possibly `data`-wrapped).
#[must_use]
pub fn decode_many<T: DeserializeOwned>(body: &Value, key: &str) -> Option<Vec<T>> {
    let inner = payload(body);
    let items = if inner.is_array() { inner } else { inner.get(key)? };
    serde_json::from_value(items.clone()).ok()
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
