//! Reading journal models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::child::Child;

/// A child's record of having read a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JournalEntry {
    pub id: Uuid,
    pub org_id: Uuid,
    pub child_id: Uuid,
    pub book_id: Uuid,
    /// 1-5 stars
    pub rating: Option<i16>,
    pub review: Option<String>,
    pub read_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Journal entry with the book it refers to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JournalEntryWithBook {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub book_title: String,
    pub book_authors: Vec<String>,
    pub book_cover_url: Option<String>,
}

/// Public reader page payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReaderJournal {
    pub child: Child,
    pub entries: Vec<JournalEntryWithBook>,
}

/// Create journal entry request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateJournalEntry {
    #[validate(required(message = "child_id is required"))]
    pub child_id: Option<Uuid>,
    #[validate(required(message = "book_id is required"))]
    pub book_id: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
    #[validate(length(max = 5000, message = "Review is too long"))]
    pub review: Option<String>,
    pub read_date: Option<NaiveDate>,
}

/// Store input for a new journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournalEntry {
    pub child_id: Uuid,
    pub book_id: Uuid,
    pub rating: Option<i16>,
    pub review: Option<String>,
    pub read_date: Option<NaiveDate>,
}
