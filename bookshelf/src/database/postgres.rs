//! PostgreSQL book store implementation

use crate::database::traits::{BookStore, StoreError};
use crate::database::{quote_identifier, DEFAULT_TABLE};
use crate::schema::{Book, NewBook};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

/// PostgreSQL book store
pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    /// Create a new PostgreSQL store over the default `books` table
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, DEFAULT_TABLE)
    }

    /// Create a new PostgreSQL store over a custom table
    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Create the books table if it does not exist yet
    ///
    /// Requires PostgreSQL 13+ for the built-in `gen_random_uuid()`.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let statement = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
                name TEXT NOT NULL,
                author TEXT NOT NULL,
                year INTEGER NOT NULL
            )
            "#,
            quote_identifier(&self.table)
        );

        sqlx::query(&statement).execute(&self.pool).await?;
        Ok(())
    }

    fn table(&self) -> String {
        quote_identifier(&self.table)
    }

    /// Convert a PostgreSQL row to a book
    fn row_to_book(row: &PgRow) -> Result<Book, StoreError> {
        Ok(Book {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            author: row.try_get("author")?,
            year: row.try_get("year")?,
        })
    }
}

#[async_trait]
impl BookStore for PostgresStore {
    async fn insert_book(&self, book: &NewBook) -> Result<Option<Book>, StoreError> {
        let query = format!(
            "INSERT INTO {} (name, author, year) VALUES ($1, $2, $3) RETURNING id, name, author, year",
            self.table()
        );
        debug!(table = %self.table, "inserting book");

        let row = sqlx::query(&query)
            .bind(&book.name)
            .bind(&book.author)
            .bind(book.year)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_book).transpose()
    }

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let query = format!("SELECT id, name, author, year FROM {}", self.table());

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_book).collect()
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let query = format!(
            "SELECT id, name, author, year FROM {} WHERE id = $1 LIMIT 2",
            self.table()
        );

        let rows = sqlx::query(&query).bind(id).fetch_all(&self.pool).await?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Self::row_to_book(row).map(Some),
            _ => Err(StoreError::MultipleRows(id.to_string())),
        }
    }

    async fn update_book(&self, id: &str, book: &NewBook) -> Result<u64, StoreError> {
        let query = format!(
            "UPDATE {} SET name = $1, author = $2, year = $3 WHERE id = $4",
            self.table()
        );
        debug!(table = %self.table, book_id = %id, "updating book");

        let result = sqlx::query(&query)
            .bind(&book.name)
            .bind(&book.author)
            .bind(book.year)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_book(&self, id: &str) -> Result<u64, StoreError> {
        let query = format!("DELETE FROM {} WHERE id = $1", self.table());
        debug!(table = %self.table, book_id = %id, "deleting book");

        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
