//! ISBN lookup endpoint

use axum::{extract::State, Json};

use super::QueryParams;
use crate::{
    error::{AppError, AppResult},
    models::book::{BookLookup, IsbnQuery},
    tenant::TenantScope,
    AppState,
};

/// Fetch bibliographic data for an ISBN
#[utoipa::path(
    get,
    path = "/isbn",
    tag = "catalog",
    security(("organization" = [])),
    params(
        ("isbn" = String, Query, description = "ISBN-10 or ISBN-13, separators allowed")
    ),
    responses(
        (status = 200, description = "Book data ready to create a book", body = BookLookup),
        (status = 400, description = "Missing or malformed ISBN", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown ISBN", body = crate::error::ErrorResponse),
        (status = 502, description = "ISBN provider failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn lookup_isbn(
    State(state): State<AppState>,
    _scope: TenantScope,
    QueryParams(query): QueryParams<IsbnQuery>,
) -> AppResult<Json<BookLookup>> {
    let isbn = query
        .isbn
        .ok_or_else(|| AppError::validation("isbn", "ISBN parameter required"))?;

    let book = state.services.isbn.lookup(&isbn).await?;
    Ok(Json(book))
}
