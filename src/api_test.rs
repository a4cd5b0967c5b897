use super::*;
use crate::board::Task;
use reqwest::Method;

// =============================================================================
// endpoints
// =============================================================================

#[test]
fn board_lists_endpoint_formats_expected_path() {
    assert_eq!(board_lists_endpoint("b1"), "/api/boards/b1/lists");
}

#[test]
fn list_cards_endpoint_formats_expected_path() {
    assert_eq!(list_cards_endpoint("l1"), "/api/lists/l1/cards");
}

#[test]
fn card_endpoints_format_expected_paths() {
    assert_eq!(card_endpoint("c1"), "/api/cards/c1");
    assert_eq!(card_move_endpoint("c1"), "/api/cards/c1/move");
}

#[test]
fn comment_endpoints_format_expected_paths() {
    assert_eq!(card_comments_endpoint("c1"), "/api/comments/c1");
    assert_eq!(comment_endpoint("m1"), "/api/comments/m1");
}

// =============================================================================
// request builders
// =============================================================================

#[test]
fn refresh_posts_refresh_token() {
    let req = refresh("r1");
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, REFRESH_PATH);
    assert_eq!(req.body, Some(json!({ "refreshToken": "r1" })));
    assert!(req.is_refresh());
}

#[test]
fn credential_endpoints_skip_refresh() {
    assert!(!login("a@b.c", "pw").refresh_on_401);
    assert!(!register("A", "a@b.c", "pw").refresh_on_401);
    assert!(!logout(None).refresh_on_401);
}

#[test]
fn logout_includes_refresh_token_when_known() {
    assert_eq!(logout(Some("r1")).body, Some(json!({ "refreshToken": "r1" })));
    assert!(logout(None).body.is_none());
}

#[test]
fn move_card_body_shape() {
    let req = move_card("c1", "l2", 3);
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/api/cards/c1/move");
    assert_eq!(req.body, Some(json!({ "toListId": "l2", "toIndex": 3 })));
}

#[test]
fn create_card_omits_missing_description() {
    let req = create_card("l1", "Write docs", None);
    assert_eq!(req.path, CARDS_PATH);
    assert_eq!(req.body, Some(json!({ "listId": "l1", "title": "Write docs" })));

    let req = create_card("l1", "Write docs", Some("soon"));
    assert_eq!(req.body.unwrap()["description"], "soon");
}

#[test]
fn card_crud_methods() {
    assert_eq!(get_card("c1").method, Method::GET);
    assert_eq!(update_card("c1", json!({})).method, Method::PATCH);
    assert_eq!(delete_card("c1").method, Method::DELETE);
}

#[test]
fn comment_crud_methods_and_bodies() {
    assert_eq!(list_comments("c1").method, Method::GET);
    assert_eq!(create_comment("c1", "hi").body, Some(json!({ "content": "hi" })));
    assert_eq!(update_comment("m1", "edit").method, Method::PATCH);
    assert_eq!(delete_comment("m1").path, "/api/comments/m1");
}

// =============================================================================
// response shapes
// =============================================================================

#[test]
fn payload_unwraps_data() {
    let body = json!({ "status": 200, "data": { "id": "c1" } });
    assert_eq!(payload(&body), &json!({ "id": "c1" }));
}

#[test]
fn payload_passes_through_unwrapped_and_null_data() {
    let body = json!({ "id": "c1" });
    assert_eq!(payload(&body), &body);
    let body = json!({ "id": "c1", "data": null });
    assert_eq!(payload(&body), &body);
}

#[test]
fn decode_one_reads_wrapped_task() {
    let body = json!({ "data": { "id": "c1", "title": "T", "orderIdx": 2 } });
    let task: Task = decode_one(&body).unwrap();
    assert_eq!(task.id, "c1");
    assert_eq!(task.order_idx, 2);
}

#[test]
fn decode_many_accepts_array_or_keyed_object() {
    let bare = json!([{ "id": "c1", "title": "A" }]);
    let keyed = json!({ "data": { "cards": [{ "id": "c2", "title": "B" }] } });
    let a: Vec<Task> = decode_many(&bare, "cards").unwrap();
    let b: Vec<Task> = decode_many(&keyed, "cards").unwrap();
    assert_eq!(a[0].id, "c1");
    assert_eq!(b[0].id, "c2");
}

#[test]
fn decode_many_missing_key_is_none() {
    assert!(decode_many::<Task>(&json!({ "items": [] }), "cards").is_none());
}
