use super::*;
use serde_json::json;

// =============================================================================
// GatewayError::from_response
// =============================================================================

#[test]
fn from_response_uses_server_message() {
    let err = GatewayError::from_response(422, Some(json!({ "message": "title is required" })));
    assert_eq!(err.status(), 422);
    assert_eq!(err.user_message(), "title is required");
}

#[test]
fn from_response_falls_back_to_error_field() {
    let err = GatewayError::from_response(403, Some(json!({ "error": "forbidden" })));
    assert_eq!(err.user_message(), "forbidden");
}

#[test]
fn from_response_generic_fallback_without_body() {
    let err = GatewayError::from_response(500, None);
    assert_eq!(err.user_message(), "Request failed with status code 500");
}

#[test]
fn from_response_ignores_blank_message() {
    let err = GatewayError::from_response(400, Some(json!({ "message": "  " })));
    assert_eq!(err.user_message(), "Request failed with status code 400");
}

#[test]
fn from_response_falls_back_to_error_when_message_blank() {
    let err = GatewayError::from_response(400, Some(json!({ "message": "", "error": "Bad input" })));
    assert_eq!(err.user_message(), "Bad input");
}

#[test]
fn from_response_keeps_body() {
    let body = json!({ "message": "nope", "data": { "field": "title" } });
    let GatewayError::Http { body: kept, .. } = GatewayError::from_response(400, Some(body.clone())) else {
        panic!("expected Http variant");
    };
    assert_eq!(kept, Some(body));
}

// =============================================================================
// status / envelope
// =============================================================================

#[test]
fn network_status_is_zero() {
    let err = GatewayError::network("connection refused");
    assert_eq!(err.status(), NETWORK_STATUS);
    assert!(err.user_message().contains("connection"));
}

#[test]
fn auth_expired_message_mentions_login() {
    assert!(GatewayError::AuthExpired.user_message().contains("log in"));
}

#[test]
fn envelope_carries_body_as_data() {
    let err = GatewayError::from_response(409, Some(json!({ "message": "conflict" })));
    let envelope = err.envelope();
    assert_eq!(envelope.status, 409);
    assert_eq!(envelope.message, "conflict");
    assert_eq!(envelope.data, Some(json!({ "message": "conflict" })));
}

#[test]
fn envelope_network_has_no_data() {
    let envelope = GatewayError::network("dns").envelope();
    assert_eq!(envelope.status, 0);
    assert!(envelope.data.is_none());
}

// =============================================================================
// MutationError
// =============================================================================

#[test]
fn rolled_back_exposes_gateway_error() {
    let err = MutationError::RolledBack { kind: "card move", source: GatewayError::AuthExpired, refetched: false };
    assert!(err.is_session_expired());
    assert_eq!(err.gateway_error(), Some(&GatewayError::AuthExpired));
    assert!(err.to_string().starts_with("card move rolled back"));
}

#[test]
fn rejected_has_no_gateway_error() {
    let err = MutationError::Rejected { kind: "card delete", source: BoardError::UnknownTask("t9".into()) };
    assert!(err.gateway_error().is_none());
    assert!(!err.is_session_expired());
    assert_eq!(err.user_message(), "unknown task: t9");
}
