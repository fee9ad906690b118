// ==================================
// tests/integration/auth_flow_tests.rs
// ==================================
//! End-to-end authentication through the router.
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use courses_backend_lib::auth::Principal;
use serde_json::json;

use crate::test_utils::*;

#[tokio::test]
async fn test_login_issues_token() {
    let (state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;

    let auth = basic_auth("alice@example.com", "hunter2");
    let response = send(&app, request("GET", "/api/users", Some(&auth), None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["emailAddress"], "alice@example.com");
    assert_eq!(response.body["user"]["firstName"], "Alice");
    assert!(response.body["user"].get("password").is_none());

    let token = response.body["token"].as_str().unwrap();
    let principal = state.gate.tokens().verify(token).unwrap();
    assert_eq!(principal.identity(), "alice@example.com");
}

#[tokio::test]
async fn test_dedicated_login_route_requires_credentials() {
    let (_state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;

    let auth = basic_auth("alice@example.com", "hunter2");
    let response = send(&app, request("POST", "/api/users/login", Some(&auth), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap().to_string();

    // A token is not a credential pair.
    let response = send(&app, request("POST", "/api/users/login", Some(&bearer(&token)), None)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_password_looks_like_unknown_account() {
    let (_state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;

    let wrong = basic_auth("alice@example.com", "wrong");
    let bad_password = send(&app, request("GET", "/api/users", Some(&wrong), None)).await;

    let stranger = basic_auth("nobody@example.com", "hunter2");
    let unknown = send(&app, request("GET", "/api/users", Some(&stranger), None)).await;

    assert_eq!(bad_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad_password.body, unknown.body);
    assert_eq!(bad_password.body["error"]["message"], "Access Denied");
}

#[tokio::test]
async fn test_missing_header_is_denied() {
    let (_state, app, _temp_dir) = setup_test_env();

    let response = send(&app, request("GET", "/api/users", None, None)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["message"], "Access Denied");
}

#[tokio::test]
async fn test_identity_is_case_insensitive() {
    let (_state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "Alice@Example.com", "hunter2").await;

    let token = login(&app, "ALICE@example.COM", "hunter2").await;
    assert!(!token.is_empty());

    // The same address in another case is the same account.
    let body = json!({
        "firstName": "Shadow",
        "lastName": "Alice",
        "emailAddress": "alice@EXAMPLE.com",
        "password": "other",
    });
    let response = send(&app, request("POST", "/api/users", None, Some(body))).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_token_read_returns_user_without_token() {
    let (_state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;
    let token = login(&app, "alice@example.com", "hunter2").await;

    let response = send(&app, request("GET", "/api/users", Some(&bearer(&token)), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["lastName"], "Liddell");
    assert!(response.body.get("token").is_none());

    // Legacy clients omit the scheme.
    let response = send(&app, request("GET", "/api/users", Some(&token), None)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_each_login_issues_a_fresh_token() {
    let (_state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;

    let first = login(&app, "alice@example.com", "hunter2").await;
    let second = login(&app, "alice@example.com", "hunter2").await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_expired_token_is_denied() {
    let (state, app, _temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;

    let issued = Utc::now() - state.gate.tokens().ttl() - Duration::minutes(1);
    let expired = state
        .gate
        .tokens()
        .issue_at(&Principal::from_identity("alice@example.com"), issued)
        .unwrap();

    let response = send(&app, request("GET", "/api/users", Some(&bearer(&expired)), None)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["message"], "Access Denied");
}

#[tokio::test]
async fn test_token_for_deleted_account_is_denied() {
    let (state, app, _temp_dir) = setup_test_env();

    let orphan = state
        .gate
        .issue_token(&Principal::from_identity("ghost@example.com"))
        .unwrap();
    let response = send(&app, request("GET", "/api/users", Some(&bearer(&orphan)), None)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation() {
    let (_state, app, _temp_dir) = setup_test_env();

    let body = json!({ "firstName": "Alice", "emailAddress": "not-an-email" });
    let response = send(&app, request("POST", "/api/users", None, Some(body))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e.as_str())
        .collect();
    assert_eq!(
        errors,
        vec![
            "Registration requires a last name.",
            "Enter a valid email address.",
            "Registration requires a password.",
        ]
    );
}

#[tokio::test]
async fn test_registration_sets_location() {
    let (_state, app, _temp_dir) = setup_test_env();
    let body = json!({
        "firstName": "Bob",
        "lastName": "Builder",
        "emailAddress": "bob@example.com",
        "password": "swordfish",
    });
    let response = send(&app, request("POST", "/api/users", None, Some(body))).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.headers["location"], "/");
}

#[tokio::test]
async fn test_store_failure_is_not_access_denied() {
    let (_state, app, temp_dir) = setup_test_env();
    register(&app, "Alice", "Liddell", "alice@example.com", "hunter2").await;
    let token = login(&app, "alice@example.com", "hunter2").await;
    let location = create_course(&app, &token, "Rust Basics").await;

    std::fs::write(temp_dir.path().join("accounts").join("x.json"), "{not json").unwrap();

    let auth = basic_auth("alice@example.com", "hunter2");
    let whoami = send(&app, request("GET", "/api/users", Some(&auth), None)).await;
    assert_eq!(whoami.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(whoami.body["error"]["code"], "JSON_001");

    // The token verifies without the store; the ownership check needs it.
    let delete = send(&app, request("DELETE", &location, Some(&bearer(&token)), None)).await;
    assert_eq!(delete.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(delete.body["error"]["message"], "Access Denied");

    std::fs::remove_file(temp_dir.path().join("accounts").join("x.json")).unwrap();
    let course = send(&app, request("GET", &location, None, None)).await;
    assert_eq!(course.status, StatusCode::OK);
}
