//! Bulk import endpoint

use axum::{extract::State, Json};

use super::JsonBody;
use crate::{
    error::AppResult,
    models::import_report::{CsvImportRequest, ImportReport},
    tenant::TenantScope,
    AppState,
};

/// Import books and copies from CSV (`title,authors,isbn,copies`)
#[utoipa::path(
    post,
    path = "/import/csv",
    tag = "catalog",
    security(("organization" = [])),
    request_body = CsvImportRequest,
    responses(
        (status = 200, description = "Per-row import report", body = ImportReport),
        (status = 400, description = "Empty or unreadable CSV", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_csv(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(request): JsonBody<CsvImportRequest>,
) -> AppResult<Json<ImportReport>> {
    let report = state.services.import.import_csv(&scope, request).await?;
    Ok(Json(report))
}
