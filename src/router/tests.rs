use http::Method;
use serde_json::json;

use super::{sanitize_uri, split_args, split_uri, RouteTarget, Router};
use crate::dispatcher::Dispatcher;

#[test]
fn test_root_path() {
    let (re, params) = Router::path_to_regex("/").unwrap();
    assert!(re.is_match("/"));
    assert!(params.is_empty());
}

#[test]
fn test_parameterized_path() {
    let (re, params) = Router::path_to_regex("/items/{id}").unwrap();
    assert!(re.is_match("/items/123"));
    assert!(!re.is_match("/items/123/extra"));
    assert_eq!(params, vec!["id"]);
}

#[test]
fn test_literal_segments_are_escaped() {
    let (re, _) = Router::path_to_regex("/v1.0/{a}").unwrap();
    assert!(re.is_match("/v1.0/x"));
    assert!(!re.is_match("/v1x0/x"));
}

#[test]
fn test_split_uri_empty_uses_defaults() {
    assert_eq!(split_uri(""), RouteTarget::default());
    assert_eq!(split_uri("/"), RouteTarget::default());
    assert_eq!(split_uri("/?page=2"), RouteTarget::default());
}

#[test]
fn test_split_uri_segments_and_decoding() {
    let target = split_uri("/user/view/John%20Doe/2/?x=1");
    assert_eq!(target.handler.as_deref(), Some("user"));
    assert_eq!(target.action.as_deref(), Some("view"));
    assert_eq!(target.params, vec!["John Doe".to_string(), "2".to_string()]);
    assert_eq!(target.params_value(), json!(["John Doe", "2"]));
}

#[test]
fn test_split_uri_handler_only() {
    let target = split_uri("user");
    assert_eq!(target.handler.as_deref(), Some("user"));
    assert_eq!(target.action, None);
    assert!(target.params.is_empty());
}

#[test]
fn test_sanitize_drops_unsafe_characters() {
    assert_eq!(sanitize_uri("/user/view"), "/user/view");
    assert_eq!(sanitize_uri("/us er/\u{e9}view"), "/user/view");
}

#[test]
fn test_split_args() {
    let target = split_args(&["main", "hello", "world", "again"]);
    assert_eq!(target.handler.as_deref(), Some("main"));
    assert_eq!(target.action.as_deref(), Some("hello"));
    assert_eq!(target.params, vec!["world".to_string(), "again".to_string()]);

    let empty: [&str; 0] = [];
    assert_eq!(split_args(&empty), RouteTarget::default());
}

#[test]
fn test_table_route_wins_over_split() {
    let mut router = Router::new();
    router
        .add(Method::GET, "/users/{id}", "user", "view")
        .unwrap();
    router
        .add(Method::POST, "/users", "user", "register")
        .unwrap();

    let target = router.route(&Method::GET, "/users/9?full=1");
    assert_eq!(target.handler.as_deref(), Some("user"));
    assert_eq!(target.action.as_deref(), Some("view"));
    assert_eq!(target.params, vec!["9".to_string()]);

    let target = router.route(&Method::POST, "/users/");
    assert_eq!(target.action.as_deref(), Some("register"));

    // Method mismatch falls back to the positional split.
    let target = router.route(&Method::DELETE, "/users/9");
    assert_eq!(target.handler.as_deref(), Some("users"));
    assert_eq!(target.action.as_deref(), Some("9"));
}

#[test]
fn test_route_display() {
    let mut router = Router::new();
    router.add(Method::GET, "/", "index", "index").unwrap();
    assert_eq!(router.routes()[0].to_string(), "GET / -> index/index");
    assert!(!router.is_empty());
}

#[test]
fn test_apply_keeps_params_when_none_routed() {
    let mut dispatcher: Dispatcher = Dispatcher::default();
    dispatcher.set_params(json!(["kept"]));
    split_uri("/user").apply(&mut dispatcher);
    assert_eq!(dispatcher.controller_name(), Some("user"));
    assert_eq!(dispatcher.action_name(), None);
    assert_eq!(dispatcher.params(), &json!(["kept"]));
}
