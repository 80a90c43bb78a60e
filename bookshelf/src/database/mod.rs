//! Store abstraction layer
//!
//! This module provides a backend-agnostic interface for book persistence,
//! with SQL implementations and a client for a hosted REST database.

pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "supabase")]
pub mod supabase;

// Re-export the main trait
pub use traits::{BookStore, StoreError};

/// Table used when none is configured
pub const DEFAULT_TABLE: &str = "books";

/// Quote an identifier to prevent SQL injection
pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
