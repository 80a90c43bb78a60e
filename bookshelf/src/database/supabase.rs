//! Hosted Supabase book store
//!
//! Talks to the PostgREST endpoint Supabase exposes under `/rest/v1`.
//! Mutations ask for `Prefer: return=representation` so the affected rows
//! come back in the response body and can be counted, which lets the
//! handlers tell "not found" apart from "updated" in a single round trip.

use crate::database::traits::{BookStore, StoreError};
use crate::database::DEFAULT_TABLE;
use crate::schema::{Book, NewBook};
use crate::Error;
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

const RETURN_REPRESENTATION: &str = "return=representation";

/// Postgres `invalid_text_representation`, raised when an id filter value
/// cannot be cast to the id column's type (e.g. `eq.abc` on a bigint)
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Supabase (PostgREST) book store
#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: Url,
    key: String,
    table: String,
}

/// Error body PostgREST sends with non-success responses
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl SupabaseStore {
    /// Create a new store for the project at `url`, authenticating with `key`
    ///
    /// # Arguments
    ///
    /// * `url` - Project URL, e.g. `https://xyzcompany.supabase.co`
    /// * `key` - Project API key, sent as both `apikey` and bearer token
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> crate::Result<Self> {
        let url = url.into();
        let key = key.into();

        if url.trim().is_empty() {
            return Err(Error::InvalidConfig("Supabase URL is empty".to_string()));
        }
        if key.is_empty() {
            return Err(Error::InvalidConfig("Supabase key is empty".to_string()));
        }

        let base_url = Url::parse(url.trim())
            .map_err(|error| Error::InvalidConfig(format!("Invalid Supabase URL: {error}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "Supabase URL cannot hold a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|error| Error::InvalidConfig(error.to_string()))?;

        Ok(Self {
            client,
            base_url,
            key,
            table: DEFAULT_TABLE.to_string(),
        })
    }

    /// Use a table other than `books`
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// `{project}/rest/v1/{table}`, with the table percent-encoded as one segment
    fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["rest", "v1", self.table.as_str()]);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }

    fn id_filter(id: &str) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }

    /// Decode a response body holding an array of rows
    ///
    /// An empty body counts as zero rows.
    async fn read_rows(response: Response) -> Result<Vec<Book>, StoreError> {
        let status = response.status();
        let body = response.bytes().await?;
        Self::decode_rows(status, &body, false)
    }

    /// Like [`Self::read_rows`] for requests filtered by id
    ///
    /// An id the column type cannot represent matches no rows.
    async fn read_id_rows(response: Response) -> Result<Vec<Book>, StoreError> {
        let status = response.status();
        let body = response.bytes().await?;
        Self::decode_rows(status, &body, true)
    }

    fn decode_rows(
        status: StatusCode,
        body: &[u8],
        id_filtered: bool,
    ) -> Result<Vec<Book>, StoreError> {
        if !status.is_success() {
            let (code, message) = match serde_json::from_slice::<PostgrestError>(body) {
                Ok(error) => (error.code, error.message),
                Err(_) => (None, String::from_utf8_lossy(body).into_owned()),
            };

            if id_filtered && code.as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
                debug!(message = %message, "id filter does not fit the id column");
                return Ok(Vec::new());
            }

            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(body)?)
    }
}

#[async_trait]
impl BookStore for SupabaseStore {
    async fn insert_book(&self, book: &NewBook) -> Result<Option<Book>, StoreError> {
        debug!(table = %self.table, "inserting book");

        let response = self
            .authorize(self.client.post(self.endpoint()))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[book])
            .send()
            .await?;

        Ok(Self::read_rows(response).await?.into_iter().next())
    }

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let response = self
            .authorize(self.client.get(self.endpoint()))
            .query(&[("select", "*")])
            .send()
            .await?;

        Self::read_rows(response).await
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let response = self
            .authorize(self.client.get(self.endpoint()))
            .query(&[("select", "*")])
            .query(&Self::id_filter(id))
            .send()
            .await?;

        let mut books = Self::read_id_rows(response).await?;
        match books.len() {
            0 => Ok(None),
            1 => Ok(books.pop()),
            _ => Err(StoreError::MultipleRows(id.to_string())),
        }
    }

    async fn update_book(&self, id: &str, book: &NewBook) -> Result<u64, StoreError> {
        debug!(table = %self.table, book_id = %id, "updating book");

        let response = self
            .authorize(self.client.patch(self.endpoint()))
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(book)
            .send()
            .await?;

        Ok(Self::read_id_rows(response).await?.len() as u64)
    }

    async fn delete_book(&self, id: &str) -> Result<u64, StoreError> {
        debug!(table = %self.table, book_id = %id, "deleting book");

        let response = self
            .authorize(self.client.delete(self.endpoint()))
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;

        Ok(Self::read_id_rows(response).await?.len() as u64)
    }
}
