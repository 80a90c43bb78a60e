use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashSet;
use tower::util::ServiceExt; // for `oneshot`

use bookshelf::{Book, BookStore, BooksRouter, NewBook, SqliteStore, StoreError};

async fn sqlite_app() -> Router {
    // One connection so every request sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteStore::new(pool);
    store.ensure_table().await.unwrap();
    BooksRouter::new(store).into_router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> String {
    let (status, response) = send(app, Method::POST, "/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    response["data"]["bookId"].as_str().unwrap().to_string()
}

fn harry_potter() -> Value {
    json!({"name": "Harry Potter", "author": "J.K. Rowling", "year": 1997})
}

#[tokio::test]
async fn full_lifecycle() {
    let app = sqlite_app().await;

    let (status, body) = send(&app, Method::POST, "/books", Some(harry_potter())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let book_id = body["data"]["bookId"].as_str().unwrap().to_string();
    assert!(!book_id.is_empty());

    let uri = format!("/books/{book_id}");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["book"]["name"], "Harry Potter");
    assert_eq!(body["data"]["book"]["id"], book_id.as_str());

    let update = json!({"name": "Harry Potter", "author": "J.K. Rowling", "year": 2000});
    let (status, body) = send(&app, Method::PUT, &uri, Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["message"].is_string());

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["book"]["year"], 2000);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn create_rejects_incomplete_payloads() {
    let app = sqlite_app().await;
    let cases = [
        json!({"author": "J.K. Rowling", "year": 1997}),
        json!({"name": "Harry Potter", "year": 1997}),
        json!({"name": "Harry Potter", "author": "J.K. Rowling"}),
        json!({"name": "", "author": "J.K. Rowling", "year": 1997}),
        json!({"name": "Harry Potter", "author": "J.K. Rowling", "year": 0}),
        json!({"name": "Harry Potter", "author": "J.K. Rowling", "year": "soon"}),
    ];

    for case in cases {
        let (status, body) = send(&app, Method::POST, "/books", Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
        assert_eq!(body["status"], "fail");
        assert!(body["message"].as_str().unwrap().contains("name, author and year"));
    }

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"], json!([]));
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let app = sqlite_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn update_rejects_incomplete_payload_before_lookup() {
    let app = sqlite_app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/missing",
        Some(json!({"name": "Harry Potter"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("name, year and author"));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = sqlite_app().await;

    let (status, body) = send(&app, Method::GET, "/books/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"status": "fail", "message": "Book not found"}));

    let (status, _) = send(&app, Method::PUT, "/books/missing", Some(harry_potter())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/books/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_is_idempotent() {
    let app = sqlite_app().await;
    let book_id = create(&app, harry_potter()).await;
    let uri = format!("/books/{book_id}");
    let update = json!({"name": "Philosopher's Stone", "author": "J.K. Rowling", "year": 1998});

    let (first, _) = send(&app, Method::PUT, &uri, Some(update.clone())).await;
    let (_, after_first) = send(&app, Method::GET, &uri, None).await;
    let (second, _) = send(&app, Method::PUT, &uri, Some(update)).await;
    let (_, after_second) = send(&app, Method::GET, &uri, None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(after_first, after_second);
    assert_eq!(after_second["data"]["book"]["name"], "Philosopher's Stone");
}

#[tokio::test]
async fn list_returns_exactly_the_stored_books() {
    let app = sqlite_app().await;
    let mut expected = HashSet::new();
    for (name, year) in [("Dune", 1965), ("Emma", 1815), ("Ubik", 1969)] {
        let body = json!({"name": name, "author": "Someone", "year": year});
        expected.insert(create(&app, body).await);
    }

    let removed = expected.iter().next().cloned().unwrap();
    send(&app, Method::DELETE, &format!("/books/{removed}"), None).await;
    expected.remove(&removed);

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let listed: HashSet<String> = body["data"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = sqlite_app().await;

    let request = Request::builder()
        .uri("/books")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

/// Store whose every call fails
struct FailingStore;

#[async_trait]
impl BookStore for FailingStore {
    async fn insert_book(&self, _book: &NewBook) -> Result<Option<Book>, StoreError> {
        Err(StoreError::Query("connection refused".to_string()))
    }

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        Err(StoreError::Query("connection refused".to_string()))
    }

    async fn get_book(&self, _id: &str) -> Result<Option<Book>, StoreError> {
        Err(StoreError::Query("connection refused".to_string()))
    }

    async fn update_book(&self, _id: &str, _book: &NewBook) -> Result<u64, StoreError> {
        Err(StoreError::Query("connection refused".to_string()))
    }

    async fn delete_book(&self, _id: &str) -> Result<u64, StoreError> {
        Err(StoreError::Query("connection refused".to_string()))
    }
}

#[tokio::test]
async fn store_failures_are_internal_errors() {
    let app = BooksRouter::new(FailingStore).into_router();

    let requests = [
        (Method::POST, "/books", Some(harry_potter())),
        (Method::GET, "/books", None),
        (Method::GET, "/books/abc", None),
        (Method::PUT, "/books/abc", Some(harry_potter())),
        (Method::DELETE, "/books/abc", None),
    ];

    for (method, uri, body) in requests {
        let (status, response) = send(&app, method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(response["status"], "fail");
        let message = response["message"].as_str().unwrap();
        assert!(!message.contains("connection refused"), "{message}");
    }
}

/// Store that accepts inserts without echoing the record and panics on reads
struct QuietStore;

#[async_trait]
impl BookStore for QuietStore {
    async fn insert_book(&self, _book: &NewBook) -> Result<Option<Book>, StoreError> {
        Ok(None)
    }

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        panic!("list exploded")
    }

    async fn get_book(&self, _id: &str) -> Result<Option<Book>, StoreError> {
        Ok(None)
    }

    async fn update_book(&self, _id: &str, _book: &NewBook) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn delete_book(&self, _id: &str) -> Result<u64, StoreError> {
        Ok(0)
    }
}

#[tokio::test]
async fn empty_insert_result_is_plain_success() {
    let app = BooksRouter::new(QuietStore).into_router();

    let (status, body) = send(&app, Method::POST, "/books", Some(harry_potter())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn panics_become_internal_errors() {
    let app = BooksRouter::new(QuietStore).into_router();

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"status": "fail", "message": "An unexpected error occurred"})
    );
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let app = sqlite_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::PATCH)
                .uri("/books/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
