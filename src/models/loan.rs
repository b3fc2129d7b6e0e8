//! Loan (checkout) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Loan model from database.
///
/// A loan is open while `returned_at` is `None`. It is created by a checkout,
/// closed once by a return, and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: Uuid,
    pub org_id: Uuid,
    pub copy_id: Uuid,
    /// Authoritative borrower when present
    pub child_id: Option<Uuid>,
    /// Fallback borrower when no child is on file
    pub borrower_name: Option<String>,
    pub borrower_class: Option<String>,
    pub checked_out_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Loan with copy, book and borrower details for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub loan: Loan,
    pub book_id: Uuid,
    pub book_title: String,
    pub copy_barcode: Option<String>,
    pub child_emoji_id: Option<String>,
    pub child_name: Option<String>,
}

/// Checkout request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(required(message = "copy_id is required"))]
    pub copy_id: Option<Uuid>,
    pub child_id: Option<Uuid>,
    #[validate(length(max = 200, message = "Borrower name is too long"))]
    pub borrower_name: Option<String>,
    #[validate(length(max = 100, message = "Borrower class is too long"))]
    pub borrower_class: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// Return request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReturnRequest {
    #[validate(required(message = "loan_id is required"))]
    pub loan_id: Option<Uuid>,
}

/// Store input for the loan written by a checkout
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub copy_id: Uuid,
    pub child_id: Option<Uuid>,
    pub borrower_name: Option<String>,
    pub borrower_class: Option<String>,
    pub checked_out_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Which loans to list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanFilter {
    #[default]
    All,
    Active,
    Returned,
}

impl LoanFilter {
    pub fn matches(&self, loan: &Loan) -> bool {
        match self {
            LoanFilter::All => true,
            LoanFilter::Active => loan.is_open(),
            LoanFilter::Returned => !loan.is_open(),
        }
    }
}

/// Loan list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanQuery {
    pub filter: Option<LoanFilter>,
}
