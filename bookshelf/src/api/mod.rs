//! REST API endpoints
//!
//! This module contains the book handlers, the route table and the mapping
//! from handler failures to response envelopes.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::database::traits::{BookStore, StoreError};
use crate::schema::{ApiResponse, BookPayload, NewBook};

pub mod books;

// Re-export handlers for convenience
pub use books::{
    create_book_handler, delete_book_handler, get_book_handler, list_books_handler,
    update_book_handler,
};

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `store` - Arc-wrapped book store implementation
///
/// # Returns
///
/// An Axum Router configured with all book routes
pub fn create_api_router<S: BookStore>(store: Arc<S>) -> Router {
    Router::new()
        .route(
            "/books",
            get(list_books_handler::<S>).post(create_book_handler::<S>),
        )
        .route(
            "/books/{book_id}",
            get(get_book_handler::<S>)
                .put(update_book_handler::<S>)
                .delete(delete_book_handler::<S>),
        )
        .with_state(store)
}

/// Handler failure, rendered as a `fail` envelope
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required fields missing or body unreadable
    #[error("{0}")]
    Validation(&'static str),

    /// The id does not resolve to a record
    #[error("Book not found")]
    NotFound,

    /// The store reported a failure
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    /// Anything the handlers did not anticipate
    #[error("An unexpected error occurred")]
    Unhandled(String),
}

impl ApiError {
    pub fn store(message: &'static str, source: StoreError) -> Self {
        ApiError::Store { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store { .. } | ApiError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store { message, source } => {
                error!(error = %source, "{}", message);
            }
            ApiError::Unhandled(detail) => {
                error!(detail = %detail, "unhandled failure while serving request");
            }
            _ => {}
        }

        (self.status_code(), Json(ApiResponse::fail(self.to_string()))).into_response()
    }
}

/// Check a create/update body, failing with `message` if anything is missing
///
/// A body that is not valid JSON, or has a field of the wrong type, is
/// reported the same way as a missing field.
pub fn validate_payload(
    payload: Result<Json<BookPayload>, JsonRejection>,
    message: &'static str,
) -> Result<NewBook, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(rejection = %rejection, "rejected book payload");
        ApiError::Validation(message)
    })?;

    payload.into_new_book().ok_or(ApiError::Validation(message))
}

/// Panic handler for `CatchPanicLayer`
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else if let Some(text) = panic.downcast_ref::<&str>() {
        text.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Unhandled(detail).into_response()
}
