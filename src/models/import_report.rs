//! CSV catalogue import models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// CSV import request.
///
/// Expected header: `title,authors,isbn,copies`; authors are separated by `;`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CsvImportRequest {
    #[validate(length(min = 1, message = "CSV content is required"))]
    pub csv: String,
}

/// Outcome of a CSV import. Rows are imported independently; a failed row
/// does not roll back the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ImportReport {
    pub success: usize,
    pub failed: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}
