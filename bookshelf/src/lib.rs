//! # bookshelf
//!
//! A small REST API for managing a books collection, backed by an external
//! database, easily mountable into an Axum application.
//!
//! ## Routes
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | POST | `/books` | 201 `{status, message, data: {bookId}}` |
//! | GET | `/books` | 200 `{status, data: {books}}` |
//! | GET | `/books/{bookId}` | 200 `{status, data: {book}}` |
//! | PUT | `/books/{bookId}` | 200 `{status, message}` |
//! | DELETE | `/books/{bookId}` | 200 `{status, message}` |
//!
//! Failures use the same envelope with `status: "fail"` and a message:
//! 400 for incomplete payloads, 404 for unknown ids, 500 for store failures.
//!
//! ## Stores
//!
//! - Supabase (hosted PostgREST) via [`SupabaseStore`]
//! - PostgreSQL via [`PostgresStore`]
//! - SQLite via [`SqliteStore`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use bookshelf::{BooksRouter, SqliteStore};
//! use sqlx::SqlitePool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = SqlitePool::connect("sqlite:books.db?mode=rwc")
//!         .await
//!         .unwrap();
//!     let store = SqliteStore::new(pool);
//!     store.ensure_table().await.unwrap();
//!
//!     let app = Router::new()
//!         .route("/", get(|| async { "Hello, World!" }))
//!         .merge(BooksRouter::new(store).into_router());
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod api;
pub mod database;
pub mod router;
pub mod schema;

// Public exports
pub use router::BooksRouter;
pub use schema::{ApiResponse, Book, BookPayload, NewBook, ResponseStatus};

// Re-export stores
pub use database::traits::{BookStore, StoreError};

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteStore;

#[cfg(feature = "postgres")]
pub use database::postgres::PostgresStore;

#[cfg(feature = "supabase")]
pub use database::supabase::SupabaseStore;

// Error type
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
