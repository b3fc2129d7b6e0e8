//! Catalog endpoints: books, copies, locations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{JsonBody, QueryParams};
use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook},
        copy::{BookCopy, CatalogueEntry, CopyQuery, CreateCopy, UpdateCopyStatus},
        location::{CreateLocation, Location},
    },
    tenant::TenantScope,
    AppState,
};

/// List books, ordered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "catalog",
    security(("organization" = [])),
    responses(
        (status = 200, description = "Books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>, scope: TenantScope) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books(&scope).await?;
    Ok(Json(books))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "catalog",
    security(("organization" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(book): JsonBody<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(&scope, book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(&scope, id).await?;
    Ok(Json(book))
}

/// Soft delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "catalog",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List copies, optionally filtered by status
#[utoipa::path(
    get,
    path = "/copies",
    tag = "catalog",
    security(("organization" = [])),
    params(
        ("status" = Option<String>, Query, description = "available, checked_out, lost or damaged")
    ),
    responses(
        (status = 200, description = "Copies with book and location", body = Vec<CatalogueEntry>)
    )
)]
pub async fn list_copies(
    State(state): State<AppState>,
    scope: TenantScope,
    QueryParams(query): QueryParams<CopyQuery>,
) -> AppResult<Json<Vec<CatalogueEntry>>> {
    let copies = state.services.catalog.list_copies(&scope, query.status).await?;
    Ok(Json(copies))
}

/// Add a physical copy of a book
#[utoipa::path(
    post,
    path = "/copies",
    tag = "catalog",
    security(("organization" = [])),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy created", body = BookCopy),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or location not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_copy(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(copy): JsonBody<CreateCopy>,
) -> AppResult<(StatusCode, Json<BookCopy>)> {
    let copy = state.services.catalog.create_copy(&scope, copy).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Mark a copy lost, damaged or available
#[utoipa::path(
    patch,
    path = "/copies/{id}/status",
    tag = "catalog",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateCopyStatus,
    responses(
        (status = 200, description = "Copy updated", body = BookCopy),
        (status = 400, description = "Status cannot be set directly", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy is checked out", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_copy_status(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
    JsonBody(update): JsonBody<UpdateCopyStatus>,
) -> AppResult<Json<BookCopy>> {
    let copy = state.services.catalog.set_copy_status(&scope, id, update.status).await?;
    Ok(Json(copy))
}

/// Soft delete a copy
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "catalog",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy is checked out", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_copy(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_copy(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Full catalogue: every copy with its book and location
#[utoipa::path(
    get,
    path = "/catalogue",
    tag = "catalog",
    security(("organization" = [])),
    responses(
        (status = 200, description = "Catalogue", body = Vec<CatalogueEntry>)
    )
)]
pub async fn catalogue(State(state): State<AppState>, scope: TenantScope) -> AppResult<Json<Vec<CatalogueEntry>>> {
    let entries = state.services.catalog.list_copies(&scope, None).await?;
    Ok(Json(entries))
}

/// List shelf locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "catalog",
    security(("organization" = [])),
    responses(
        (status = 200, description = "Locations", body = Vec<Location>)
    )
)]
pub async fn list_locations(State(state): State<AppState>, scope: TenantScope) -> AppResult<Json<Vec<Location>>> {
    let locations = state.services.catalog.list_locations(&scope).await?;
    Ok(Json(locations))
}

/// Create a shelf location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "catalog",
    security(("organization" = [])),
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(location): JsonBody<CreateLocation>,
) -> AppResult<(StatusCode, Json<Location>)> {
    let location = state.services.catalog.create_location(&scope, location).await?;
    Ok((StatusCode::CREATED, Json(location)))
}
