use anyhow::Context;
use axum::{routing::get, Router};
use bookshelf::{BooksRouter, SupabaseStore};
use clap::Parser;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod database;

use config::{Config, StoreSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the environment may already be set
    dotenvy::dotenv().ok();
    let config = Config::parse();
    if let Err(error) = init_logging(config.log_json) {
        eprintln!("Failed to initialize logging: {error}");
    }

    let books = match config.store_settings()? {
        StoreSettings::Supabase { url, key } => {
            let store = SupabaseStore::new(url, key)?.with_table(&config.table);
            BooksRouter::new(store).into_router()
        }
        StoreSettings::Postgres { url } => {
            let store = database::connect_postgres(&url, &config.table)
                .await
                .context("Failed to set up PostgreSQL store")?;
            BooksRouter::new(store).into_router()
        }
        StoreSettings::Sqlite { url } => {
            let store = database::connect_sqlite(&url, &config.table)
                .await
                .context("Failed to set up SQLite store")?;
            BooksRouter::new(store).into_router()
        }
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .merge(books);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    info!(store = ?config.store, table = %config.table, "using book store");
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to the bookshelf API, see /books"
}

/// Initialize the tracing subscriber
///
/// Respects `RUST_LOG`, falling back to `info,tower_http=info,axum=info`.
fn init_logging(json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stdout);

    if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    }
}
