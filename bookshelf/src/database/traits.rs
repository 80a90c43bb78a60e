//! Book store trait
//!
//! This trait defines the data-access interface every backing store must provide.

use crate::schema::{Book, NewBook};
use async_trait::async_trait;
use thiserror::Error;

/// Data-access client for the books table
///
/// Implementations are shared between concurrent requests through an `Arc`,
/// so they must not hold per-request state.
#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    /// Insert a new book and return the stored record
    ///
    /// # Returns
    ///
    /// The inserted record including its store-assigned id, or `None` if the
    /// store accepted the insert without echoing the record back
    async fn insert_book(&self, book: &NewBook) -> Result<Option<Book>, StoreError>;

    /// Fetch every book, in whatever order the store yields them
    async fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Fetch the single book with the given id
    ///
    /// # Returns
    ///
    /// `None` when no record matches. More than one match is a
    /// [`StoreError::MultipleRows`].
    async fn get_book(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Overwrite all writable fields of the book with the given id
    ///
    /// # Returns
    ///
    /// Number of rows the update matched
    async fn update_book(&self, id: &str, book: &NewBook) -> Result<u64, StoreError>;

    /// Delete the book with the given id
    ///
    /// # Returns
    ///
    /// Number of rows removed
    async fn delete_book(&self, id: &str) -> Result<u64, StoreError>;
}

/// Store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQL driver error
    #[error("Database error: {0}")]
    Query(String),

    /// Transport failure talking to a hosted store
    #[error("HTTP error: {0}")]
    Http(String),

    /// The hosted store answered with a non-success status
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// A single-row lookup matched several rows
    #[error("Expected a single row for id {0}, found several")]
    MultipleRows(String),

    /// The store returned data that does not decode into a book
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Query(error.to_string())
    }
}

#[cfg(feature = "supabase")]
impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            StoreError::Decode(error.to_string())
        } else {
            StoreError::Http(error.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Decode(error.to_string())
    }
}
