//! Book records and the JSON envelope shared by every endpoint
//!
//! Every response, successful or not, uses the same envelope shape:
//! `{ "status": "success" | "fail", "message"?: string, "data"?: object }`.

use serde::{Deserialize, Deserializer, Serialize};

/// A stored book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier
    ///
    /// Hosted tables commonly use integer identity columns while the SQL
    /// stores generate text ids, so both shapes are accepted on read.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    pub name: String,

    pub author: String,

    pub year: i32,
}

/// The writable fields of a book, used for both insert and full update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub year: i32,
}

/// Raw request body for create and update
///
/// Every field is optional here so that a missing field can be reported with
/// the operation's own message instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    pub name: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

impl BookPayload {
    /// Convert into a [`NewBook`] if every field is present and non-empty
    ///
    /// An empty string and a year of `0` count as missing.
    pub fn into_new_book(self) -> Option<NewBook> {
        let name = self.name.filter(|name| !name.is_empty())?;
        let author = self.author.filter(|author| !author.is_empty())?;
        let year = self.year.filter(|year| *year != 0)?;

        Some(NewBook { name, author, year })
    }
}

/// Outcome marker carried by every response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
}

/// Response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
    pub status: ResponseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn data(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
        }
    }

    /// Attach a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse {
    /// Successful response with only a message
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Failure response with only a message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Fail,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// `data` of a create response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookIdData {
    pub book_id: String,
}

/// `data` of a list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksData {
    pub books: Vec<Book>,
}

/// `data` of a get-by-id response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookData {
    pub book: Book,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(number) => number.to_string(),
    })
}
