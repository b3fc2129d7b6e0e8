//! Book (catalogue item) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    /// Ordered, never empty
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    /// Free-form bibliographic data (publisher, pages, reading level, ...)
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 500, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub authors: Vec<String>,
    #[validate(length(max = 32, message = "ISBN is too long"))]
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// Store input for a new book, already validated and normalized
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub metadata: serde_json::Value,
}

/// Bibliographic data found for an ISBN, shaped like a [`CreateBook`] body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookLookup {
    pub title: String,
    pub authors: Vec<String>,
    /// Normalized ISBN (digits, and a trailing `X` for ISBN-10)
    pub isbn: String,
    pub cover_url: Option<String>,
    pub metadata: BookLookupMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookLookupMetadata {
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// ISBN lookup query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct IsbnQuery {
    pub isbn: Option<String>,
}
