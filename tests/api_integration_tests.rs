//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles, including the cache state they leave
//! behind.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_cache::{api::create_router, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state() -> AppState {
    AppState::in_memory(&Config::default())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

/// Creates one author, one genre and one book; returns their ids.
async fn seed(app: &Router) -> (i64, i64, i64) {
    let (_, author) = send(app, "POST", "/authors", Some(json!({"name": "Octavia Butler"}))).await;
    let (_, genre) = send(app, "POST", "/genres", Some(json!({"name": "Sci-Fi"}))).await;
    let author_id = author["id"].as_i64().unwrap();
    let genre_id = genre["id"].as_i64().unwrap();

    let (status, book) = send(
        app,
        "POST",
        "/books",
        Some(json!({"name": "Kindred", "authorId": author_id, "genreId": genre_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (author_id, genre_id, book["id"].as_i64().unwrap())
}

// == Users ==

#[tokio::test]
async fn test_user_lifecycle() {
    let app = create_router(create_test_state());

    let (status, created) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"username": "lauren", "email": "lauren@acorn.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, user) = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "lauren");
    assert_eq!(user["userRole"], "user");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(json!({"username": "lauren", "email": "l@acorn.example", "userRole": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, user) = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert_eq!(user["userRole"], "admin", "cached snapshot must not survive update");

    let (status, _) = send(&app, "DELETE", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/users", None).await;
    assert_eq!(list["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = create_router(create_test_state());

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"username": "", "email": "x@y.z"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("username"));
}

// == Books ==

#[tokio::test]
async fn test_book_list_is_fresh_after_create() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let (author_id, genre_id, _) = seed(&app).await;

    let (_, list) = send(&app, "GET", "/books", None).await;
    assert_eq!(list["booksCount"], 1);
    assert!(state.catalog.cache().contains_key("allBooks"));

    send(
        &app,
        "POST",
        "/books",
        Some(json!({"name": "Dawn", "authorId": author_id, "genreId": genre_id})),
    )
    .await;

    let (_, list) = send(&app, "GET", "/books", None).await;
    assert_eq!(list["booksCount"], 2);
}

#[tokio::test]
async fn test_book_with_unknown_author_rejected() {
    let app = create_router(create_test_state());

    let (status, _) = send(
        &app,
        "POST",
        "/books",
        Some(json!({"name": "Orphan", "authorId": 99, "genreId": 99})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sorted_listing_is_not_cached() {
    let state = create_test_state();
    let app = create_router(state.clone());
    seed(&app).await;

    let (status, list) = send(&app, "GET", "/books?sort=title&order=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["booksCount"], 1);
    assert!(!state.catalog.cache().contains_key("allBooks"));
}

#[tokio::test]
async fn test_author_filter_returns_only_that_author() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let (_, genre_id, _) = seed(&app).await;

    let (_, other) = send(&app, "POST", "/authors", Some(json!({"name": "Ursula K. Le Guin"}))).await;
    let other_id = other["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        "/books",
        Some(json!({"name": "The Dispossessed", "authorId": other_id, "genreId": genre_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = send(&app, "GET", &format!("/books?author={}", other_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["booksCount"], 1);
    assert_eq!(list["items"][0]["name"], "The Dispossessed");
    assert!(!state.catalog.cache().contains_key("allBooks"));

    let (_, list) = send(&app, "GET", "/books?sort=title", None).await;
    assert_eq!(list["booksCount"], 2);
    assert_eq!(list["items"][0]["name"], "Kindred");
    assert!(!state.catalog.cache().contains_key("allBooks"));

    let (_, list) = send(&app, "GET", "/books", None).await;
    assert_eq!(list["booksCount"], 2);
    assert!(state.catalog.cache().contains_key("allBooks"));
}

#[tokio::test]
async fn test_unknown_book_query_param_rejected() {
    let state = create_test_state();
    let app = create_router(state.clone());
    seed(&app).await;

    for uri in ["/books?author_id=1", "/books?authr=1", "/books?sort=pages"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    assert!(!state.catalog.cache().contains_key("allBooks"));
}

#[tokio::test]
async fn test_books_by_author_and_genre() {
    let app = create_router(create_test_state());
    let (author_id, genre_id, _) = seed(&app).await;

    let (status, list) = send(&app, "GET", &format!("/authors/{}/books", author_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"][0]["name"], "Kindred");

    let (_, list) = send(&app, "GET", &format!("/genres/{}/books", genre_id), None).await;
    assert_eq!(list["booksCount"], 1);

    let (_, list) = send(&app, "GET", "/genres/999/books", None).await;
    assert_eq!(list["booksCount"], 0);
}

#[tokio::test]
async fn test_attach_file_refreshes_book() {
    let app = create_router(create_test_state());
    let (_, _, book_id) = seed(&app).await;

    let (_, book) = send(&app, "GET", &format!("/books/{}", book_id), None).await;
    assert_eq!(book["filename"], "");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/books/{}/file", book_id),
        Some(json!({"filename": "kindred.epub"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("replaced").is_none());

    let (_, body) = send(
        &app,
        "PUT",
        &format!("/books/{}/file", book_id),
        Some(json!({"filename": "kindred-2.epub"})),
    )
    .await;
    assert_eq!(body["replaced"], "kindred.epub");

    let (_, book) = send(&app, "GET", &format!("/books/{}", book_id), None).await;
    assert_eq!(book["filename"], "kindred-2.epub");
}

// == Authors & Genres ==

#[tokio::test]
async fn test_rename_author_refreshes_cached_reads() {
    let app = create_router(create_test_state());
    let (author_id, _, _) = seed(&app).await;

    send(&app, "GET", "/authors", None).await;
    send(&app, "GET", &format!("/authors/{}", author_id), None).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/authors/{}", author_id),
        Some(json!({"name": "Octavia E. Butler"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, author) = send(&app, "GET", &format!("/authors/{}", author_id), None).await;
    assert_eq!(author["name"], "Octavia E. Butler");
    let (_, list) = send(&app, "GET", "/authors", None).await;
    assert_eq!(list["authorsCount"], 1);
    assert_eq!(list["items"][0]["name"], "Octavia E. Butler");
}

#[tokio::test]
async fn test_delete_genre_in_use_rejected() {
    let app = create_router(create_test_state());
    let (_, genre_id, _) = seed(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/genres/{}", genre_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", &format!("/genres/{}", genre_id), None).await;
    assert_eq!(status, StatusCode::OK);
}

// == Operations ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_router(create_test_state());
    seed(&app).await;

    send(&app, "GET", "/genres", None).await; // miss
    send(&app, "GET", "/genres", None).await; // hit
    send(&app, "POST", "/genres", Some(json!({"name": "Horror"}))).await;

    let (status, stats) = send(&app, "GET", "/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["invalidations"], 1);
    assert_eq!(stats["total_entries"], 0);
    assert_eq!(stats["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(create_test_state());

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
