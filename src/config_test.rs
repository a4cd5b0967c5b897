use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("HOME", "/home/alice")])).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.timeouts, Timeouts::default());
    assert_eq!(cfg.token_file, PathBuf::from("/home/alice/.boardsync/tokens.json"));
    assert_eq!(cfg.login_route, DEFAULT_LOGIN_ROUTE);
    assert_eq!(cfg.rollback_policy, RollbackPolicy::SnapshotThenRefetch);
}

#[test]
fn parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("BOARDSYNC_BASE_URL", "https://pm.example.test/"),
        ("BOARDSYNC_REQUEST_TIMEOUT_SECS", "5"),
        ("BOARDSYNC_CONNECT_TIMEOUT_SECS", "2"),
        ("BOARDSYNC_TOKEN_FILE", "/tmp/tokens.json"),
        ("BOARDSYNC_LOGIN_ROUTE", "/auth/login"),
        ("BOARDSYNC_ROLLBACK_POLICY", "always-refetch"),
    ]))
    .unwrap();
    assert_eq!(cfg.base_url, "https://pm.example.test");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.token_file, PathBuf::from("/tmp/tokens.json"));
    assert_eq!(cfg.login_route, "/auth/login");
    assert_eq!(cfg.rollback_policy, RollbackPolicy::AlwaysRefetch);
}

#[test]
fn bad_timeouts_fall_back_to_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("BOARDSYNC_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn unknown_rollback_policy_errors() {
    let err = ClientConfig::from_lookup(lookup_from(&[("BOARDSYNC_ROLLBACK_POLICY", "yolo")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("unknown BOARDSYNC_ROLLBACK_POLICY"));
}

#[test]
fn snapshot_policy_parses() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("BOARDSYNC_ROLLBACK_POLICY", "snapshot")])).unwrap();
    assert_eq!(cfg.rollback_policy, RollbackPolicy::Snapshot);
}

#[test]
fn token_file_without_home_is_relative() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.token_file, PathBuf::from("./.boardsync/tokens.json"));
}

#[test]
fn with_base_url_trims_trailing_slash() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[]))
        .unwrap()
        .with_base_url("http://localhost:8080//");
    assert_eq!(cfg.base_url, "http://localhost:8080");
}
