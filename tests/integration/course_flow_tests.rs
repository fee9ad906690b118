// ====================================
// tests/integration/course_flow_tests.rs
// ====================================
//! Course CRUD behind the request gate.
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::*;

async fn alice_and_bob(app: &axum::Router) -> (String, String) {
    register(app, "Alice", "Liddell", "alice@example.com", "hunter2").await;
    register(app, "Bob", "Builder", "bob@example.com", "swordfish").await;
    let alice = login(app, "alice@example.com", "hunter2").await;
    let bob = login(app, "bob@example.com", "swordfish").await;
    (alice, bob)
}

#[tokio::test]
async fn test_only_the_owner_may_delete() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, bob) = alice_and_bob(&app).await;
    let location = create_course(&app, &alice, "Rust Basics").await;

    let response = send(&app, request("DELETE", &location, Some(&bearer(&bob)), None)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"]["message"], "Unauthorized");

    let still_there = send(&app, request("GET", &location, None, None)).await;
    assert_eq!(still_there.status, StatusCode::OK);

    let response = send(&app, request("DELETE", &location, Some(&bearer(&alice)), None)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let gone = send(&app, request("GET", &location, None, None)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_the_owner_may_update() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, bob) = alice_and_bob(&app).await;
    let location = create_course(&app, &alice, "Rust Basics").await;
    let update = json!({ "title": "Rust Mastery", "description": "Everything" });

    let response = send(
        &app,
        request("PUT", &location, Some(&bearer(&bob)), Some(update.clone())),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, request("PUT", &location, Some(&bearer(&alice)), Some(update))).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let course = send(&app, request("GET", &location, None, None)).await;
    assert_eq!(course.body["title"], "Rust Mastery");
    assert_eq!(course.body["estimatedTime"], "6 hours");
    assert_eq!(course.body["user"]["firstName"], "Alice");
}

#[tokio::test]
async fn test_update_requires_title_and_description() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, _bob) = alice_and_bob(&app).await;
    let location = create_course(&app, &alice, "Rust Basics").await;

    let response = send(
        &app,
        request("PUT", &location, Some(&bearer(&alice)), Some(json!({ "title": "Only title" }))),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0], "Course update requires description.");
}

#[tokio::test]
async fn test_mutations_require_a_token() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, _bob) = alice_and_bob(&app).await;
    let location = create_course(&app, &alice, "Rust Basics").await;

    let anonymous = send(&app, request("DELETE", &location, None, None)).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    // Credentials never stand in for a token on token routes.
    let basic = basic_auth("alice@example.com", "hunter2");
    let with_basic = send(&app, request("DELETE", &location, Some(&basic), None)).await;
    assert_eq!(with_basic.status, StatusCode::UNAUTHORIZED);

    let body = json!({ "title": "New", "description": "Course" });
    let create = send(&app, request("POST", "/api/courses", Some(&basic), Some(body))).await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);

    let forged = send(&app, request("DELETE", &location, Some(&bearer("a.b.c")), None)).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.body, anonymous.body);
}

#[tokio::test]
async fn test_unknown_course_is_not_found() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, _bob) = alice_and_bob(&app).await;

    let uri = format!("/api/courses/{}", Uuid::new_v4());
    let response = send(&app, request("DELETE", &uri, Some(&bearer(&alice)), None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, request("GET", "/api/courses/not-a-uuid", None, None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_listing_is_public_and_sorted() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, bob) = alice_and_bob(&app).await;
    create_course(&app, &bob, "Woodworking").await;
    create_course(&app, &alice, "Algebra").await;

    let response = send(&app, request("GET", "/api/courses", None, None)).await;
    assert_eq!(response.status, StatusCode::OK);

    let courses = response.body.as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["title"], "Algebra");
    assert_eq!(courses[0]["user"]["lastName"], "Liddell");
    assert_eq!(courses[1]["title"], "Woodworking");
    assert_eq!(courses[1]["user"]["firstName"], "Bob");
    assert!(courses[1]["user"].get("emailAddress").is_none());
}

#[tokio::test]
async fn test_create_validates_input() {
    let (_state, app, _temp_dir) = setup_test_env();
    let (alice, _bob) = alice_and_bob(&app).await;

    let response = send(
        &app,
        request("POST", "/api/courses", Some(&bearer(&alice)), Some(json!({}))),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["errors"],
        json!(["Course creation requires title.", "Course creation requires description."])
    );
}

#[tokio::test]
async fn test_root_and_fallback() {
    let (_state, app, _temp_dir) = setup_test_env();

    let root = send(&app, request("GET", "/", None, None)).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["message"], "Welcome to the Courses API!");

    let missing = send(&app, request("GET", "/nope", None, None)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Route Not Found");
}
