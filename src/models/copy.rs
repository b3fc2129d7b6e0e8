//! Copy (physical book) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Circulation status of a copy.
///
/// `CheckedOut` is owned by checkout/return: a copy is checked out exactly
/// when it has an open loan. `Lost` and `Damaged` are set by catalogue
/// management and block checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "copy_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Available,
    CheckedOut,
    Lost,
    Damaged,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::CheckedOut => "checked_out",
            CopyStatus::Lost => "lost",
            CopyStatus::Damaged => "damaged",
        }
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copy model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: Uuid,
    pub org_id: Uuid,
    pub book_id: Uuid,
    pub location_id: Option<Uuid>,
    pub barcode: Option<String>,
    pub status: CopyStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Copy joined with its book and shelf location for the catalogue view
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CatalogueEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub copy: BookCopy,
    pub book_title: String,
    pub book_authors: Vec<String>,
    pub book_isbn: Option<String>,
    pub book_cover_url: Option<String>,
    pub location_name: Option<String>,
}

/// Create copy request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCopy {
    #[validate(required(message = "book_id is required"))]
    pub book_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    #[validate(length(max = 64, message = "Barcode is too long"))]
    pub barcode: Option<String>,
    /// Defaults to `available`; `checked_out` is rejected
    pub status: Option<CopyStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Store input for a new copy
#[derive(Debug, Clone, PartialEq)]
pub struct NewCopy {
    pub book_id: Uuid,
    pub location_id: Option<Uuid>,
    pub barcode: Option<String>,
    pub status: CopyStatus,
    pub notes: Option<String>,
}

/// Catalogue management status change (lost, damaged, found again)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCopyStatus {
    pub status: CopyStatus,
}

/// Copy list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyQuery {
    pub status: Option<CopyStatus>,
}
