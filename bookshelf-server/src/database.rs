use bookshelf::{PostgresStore, SqliteStore, StoreError};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;

/// Connect to PostgreSQL and create the books table if needed
pub async fn connect_postgres(url: &str, table: &str) -> bookshelf::Result<PostgresStore> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .map_err(StoreError::from)?;

    let store = PostgresStore::with_table(pool, table);
    store.ensure_table().await?;
    Ok(store)
}

/// Connect to SQLite and create the books table if needed
///
/// Use a `?mode=rwc` URL to create the database file on first start.
pub async fn connect_sqlite(url: &str, table: &str) -> bookshelf::Result<SqliteStore> {
    let pool = SqlitePoolOptions::new()
        .connect(url)
        .await
        .map_err(StoreError::from)?;

    let store = SqliteStore::with_table(pool, table);
    store.ensure_table().await?;
    Ok(store)
}
