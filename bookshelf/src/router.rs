//! BooksRouter - Main Axum integration point
//!
//! This module wires a [`BookStore`] into the route table and wraps it with
//! the middleware every deployment gets.

use crate::api::{create_api_router, handle_panic};
use crate::database::traits::BookStore;
use axum::Router;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteStore;

#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresStore;

#[cfg(feature = "supabase")]
use crate::database::supabase::SupabaseStore;

/// Books REST API bound to a store
///
/// # Example
///
/// ```rust,no_run
/// use bookshelf::BooksRouter;
/// use sqlx::SqlitePool;
///
/// # async fn example() {
/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
/// let app = BooksRouter::sqlite(pool).into_router();
/// # }
/// ```
pub struct BooksRouter<S: BookStore> {
    store: Arc<S>,
}

impl<S: BookStore> BooksRouter<S> {
    /// Create a new router over the given store
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Create a new router over a store that is already shared elsewhere
    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Convert into an Axum Router
    ///
    /// The returned router includes:
    /// - The five book routes under `/books`
    /// - Panic catching, answering 500 with a `fail` envelope
    /// - Request tracing
    /// - Permissive CORS (any origin)
    pub fn into_router(self) -> Router {
        create_api_router(self.store)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "sqlite")]
impl BooksRouter<SqliteStore> {
    /// Create a new router backed by SQLite
    ///
    /// The `books` table must already exist, see [`SqliteStore::ensure_table`].
    pub fn sqlite(pool: sqlx::SqlitePool) -> Self {
        Self::new(SqliteStore::new(pool))
    }
}

#[cfg(feature = "postgres")]
impl BooksRouter<PostgresStore> {
    /// Create a new router backed by PostgreSQL
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::new(PostgresStore::new(pool))
    }
}

#[cfg(feature = "supabase")]
impl BooksRouter<SupabaseStore> {
    /// Create a new router backed by a hosted Supabase project
    pub fn supabase(url: impl Into<String>, key: impl Into<String>) -> crate::Result<Self> {
        Ok(Self::new(SupabaseStore::new(url, key)?))
    }
}
