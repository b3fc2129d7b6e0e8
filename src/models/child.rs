//! Child (anonymous reader) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Child model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Child {
    pub id: Uuid,
    pub org_id: Uuid,
    /// Three-symbol anonymous identifier, e.g. "🐶🌈🎨"
    pub emoji_id: String,
    /// Optional real name; never required
    pub name: Option<String>,
    pub grade_or_class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Register child request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateChild {
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Grade or class is too long"))]
    pub grade_or_class: Option<String>,
}

/// Update child request.
///
/// `regenerate_emoji` and `custom_emoji_id` are mutually exclusive.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateChild {
    pub regenerate_emoji: Option<bool>,
    pub custom_emoji_id: Option<String>,
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Grade or class is too long"))]
    pub grade_or_class: Option<String>,
}

/// Store input for a new child
#[derive(Debug, Clone, PartialEq)]
pub struct NewChild {
    pub emoji_id: String,
    pub name: Option<String>,
    pub grade_or_class: Option<String>,
}

/// Store input for a child update; `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildChanges {
    pub emoji_id: Option<String>,
    pub name: Option<String>,
    pub grade_or_class: Option<String>,
}
