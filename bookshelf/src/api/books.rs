//! Book CRUD endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{validate_payload, ApiError};
use crate::database::traits::BookStore;
use crate::schema::{ApiResponse, BookData, BookIdData, BookPayload, BooksData};

const CREATE_INCOMPLETE: &str =
    "Failed to add book. Please provide the book's name, author and year";
const CREATE_FAILED: &str = "Failed to add book. An internal error occurred";
const CREATED: &str = "Book added successfully";

const LIST_FAILED: &str = "Failed to fetch books";
const GET_FAILED: &str = "Failed to fetch book";

const UPDATE_INCOMPLETE: &str =
    "Failed to update book. Please provide the book's name, year and author";
const UPDATE_FAILED: &str = "Failed to update book";
const UPDATED: &str = "Book updated successfully";

const DELETE_FAILED: &str = "Failed to delete book";
const DELETED: &str = "Book deleted successfully";

/// Handler for POST /books
///
/// Request body:
/// ```json
/// { "name": "Harry Potter", "author": "J.K. Rowling", "year": 1997 }
/// ```
///
/// Responds 201 with `data.bookId` when the store echoes the new record, or
/// 200 with only a message when the store accepted the insert but returned
/// nothing.
pub async fn create_book_handler<S: BookStore>(
    State(store): State<Arc<S>>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let book = validate_payload(payload, CREATE_INCOMPLETE)?;

    let inserted = store
        .insert_book(&book)
        .await
        .map_err(|error| ApiError::store(CREATE_FAILED, error))?;

    match inserted {
        Some(inserted) => {
            info!(book_id = %inserted.id, "book created");
            let body = ApiResponse::data(BookIdData {
                book_id: inserted.id,
            })
            .with_message(CREATED);
            Ok((StatusCode::CREATED, Json(body)).into_response())
        }
        None => {
            warn!("store accepted the insert but returned no record");
            Ok((StatusCode::OK, Json(ApiResponse::success(CREATED))).into_response())
        }
    }
}

/// Handler for GET /books
///
/// Returns every stored book in store order.
pub async fn list_books_handler<S: BookStore>(
    State(store): State<Arc<S>>,
) -> Result<Response, ApiError> {
    let books = store
        .list_books()
        .await
        .map_err(|error| ApiError::store(LIST_FAILED, error))?;

    Ok((StatusCode::OK, Json(ApiResponse::data(BooksData { books }))).into_response())
}

/// Handler for GET /books/{book_id}
pub async fn get_book_handler<S: BookStore>(
    State(store): State<Arc<S>>,
    Path(book_id): Path<String>,
) -> Result<Response, ApiError> {
    let book = store
        .get_book(&book_id)
        .await
        .map_err(|error| ApiError::store(GET_FAILED, error))?
        .ok_or(ApiError::NotFound)?;

    Ok((StatusCode::OK, Json(ApiResponse::data(BookData { book }))).into_response())
}

/// Handler for PUT /books/{book_id}
///
/// Overwrites name, author and year together. A zero-row update means the
/// id does not exist.
pub async fn update_book_handler<S: BookStore>(
    State(store): State<Arc<S>>,
    Path(book_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let book = validate_payload(payload, UPDATE_INCOMPLETE)?;

    let updated = store
        .update_book(&book_id, &book)
        .await
        .map_err(|error| ApiError::store(UPDATE_FAILED, error))?;

    if updated == 0 {
        return Err(ApiError::NotFound);
    }

    info!(book_id = %book_id, "book updated");
    Ok((StatusCode::OK, Json(ApiResponse::success(UPDATED))).into_response())
}

/// Handler for DELETE /books/{book_id}
pub async fn delete_book_handler<S: BookStore>(
    State(store): State<Arc<S>>,
    Path(book_id): Path<String>,
) -> Result<Response, ApiError> {
    let deleted = store
        .delete_book(&book_id)
        .await
        .map_err(|error| ApiError::store(DELETE_FAILED, error))?;

    if deleted == 0 {
        return Err(ApiError::NotFound);
    }

    info!(book_id = %book_id, "book deleted");
    Ok((StatusCode::OK, Json(ApiResponse::success(DELETED))).into_response())
}
