//! Reader page and reading journal endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::JsonBody;
use crate::{
    error::AppResult,
    models::journal::{CreateJournalEntry, JournalEntry, ReaderJournal},
    tenant::TenantScope,
    AppState,
};

/// Look up a reader by emoji identifier
#[utoipa::path(
    get,
    path = "/reader/{emoji_id}",
    tag = "reader",
    security(("organization" = [])),
    params(
        ("emoji_id" = String, Path, description = "Three-symbol reader identifier")
    ),
    responses(
        (status = 200, description = "Reader and their journal", body = ReaderJournal),
        (status = 404, description = "No reader with this identifier", body = crate::error::ErrorResponse)
    )
)]
pub async fn reader_lookup(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(emoji_id): Path<String>,
) -> AppResult<Json<ReaderJournal>> {
    let page = state.services.journal.reader_lookup(&scope, &emoji_id).await?;
    Ok(Json(page))
}

/// Record that a child read a book
#[utoipa::path(
    post,
    path = "/journal",
    tag = "reader",
    security(("organization" = [])),
    request_body = CreateJournalEntry,
    responses(
        (status = 201, description = "Entry recorded", body = JournalEntry),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Child or book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_journal_entry(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(request): JsonBody<CreateJournalEntry>,
) -> AppResult<(StatusCode, Json<JournalEntry>)> {
    let entry = state.services.journal.add_entry(&scope, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
