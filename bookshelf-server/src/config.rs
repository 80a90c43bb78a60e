//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use thiserror::Error;

/// Runtime configuration
///
/// Every flag falls back to an environment variable, and a `.env` file in the
/// working directory is loaded before parsing.
#[derive(Debug, Clone, Parser)]
#[command(name = "bookshelf-server", version, about = "Books REST API server")]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "BOOKSHELF_HOST", default_value = "localhost")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "BOOKSHELF_PORT", default_value_t = 9000)]
    pub port: u16,

    /// Backing store
    #[arg(long, env = "BOOKSHELF_STORE", value_enum, default_value_t = StoreKind::Supabase)]
    pub store: StoreKind,

    /// Table holding the books
    #[arg(long, env = "BOOKSHELF_TABLE", default_value = "books")]
    pub table: String,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Connection URL for the postgres and sqlite stores
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Emit JSON logs
    #[arg(long, env = "BOOKSHELF_LOG_JSON")]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Supabase,
    Postgres,
    Sqlite,
}

/// Connection settings for the selected store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Supabase { url: String, key: String },
    Postgres { url: String },
    Sqlite { url: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{setting} is required when using the {store} store")]
    Missing {
        setting: &'static str,
        store: &'static str,
    },
}

impl Config {
    /// Address string accepted by `TcpListener::bind`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the settings the selected store needs
    pub fn store_settings(&self) -> Result<StoreSettings, ConfigError> {
        match self.store {
            StoreKind::Supabase => Ok(StoreSettings::Supabase {
                url: required(&self.supabase_url, "SUPABASE_URL", "supabase")?,
                key: required(&self.supabase_key, "SUPABASE_KEY", "supabase")?,
            }),
            StoreKind::Postgres => Ok(StoreSettings::Postgres {
                url: required(&self.database_url, "DATABASE_URL", "postgres")?,
            }),
            StoreKind::Sqlite => Ok(StoreSettings::Sqlite {
                url: required(&self.database_url, "DATABASE_URL", "sqlite")?,
            }),
        }
    }
}

fn required(
    value: &Option<String>,
    setting: &'static str,
    store: &'static str,
) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing { setting, store })
}
