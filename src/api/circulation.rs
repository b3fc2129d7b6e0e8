//! Checkout, return and loan listing endpoints
//!
//! Availability conflicts on `/checkout` and `/return` are reported as
//! `400 NotAvailable`, which is what circulation clients expect.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{JsonBody, QueryParams};
use crate::{
    error::{AppError, AppResult},
    models::loan::{CheckoutRequest, Loan, LoanDetails, LoanQuery, ReturnRequest},
    tenant::TenantScope,
    AppState,
};

/// Check a copy out to a child or named borrower
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "circulation",
    security(("organization" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Copy checked out", body = Loan),
        (status = 400, description = "Invalid request or copy not available", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy or child not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(request): JsonBody<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .circulation
        .checkout(&scope, request)
        .await
        .map_err(AppError::conflict_as_invalid_state)?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a checked out copy
#[utoipa::path(
    post,
    path = "/return",
    tag = "circulation",
    security(("organization" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Loan closed, copy available", body = Loan),
        (status = 400, description = "Invalid request or loan already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(request): JsonBody<ReturnRequest>,
) -> AppResult<Json<Loan>> {
    let loan = state
        .services
        .circulation
        .return_loan(&scope, request)
        .await
        .map_err(AppError::conflict_as_invalid_state)?;

    Ok(Json(loan))
}

/// List loans, newest checkout first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "circulation",
    security(("organization" = [])),
    params(
        ("filter" = Option<String>, Query, description = "all (default), active or returned")
    ),
    responses(
        (status = 200, description = "Loans with copy and borrower details", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    scope: TenantScope,
    QueryParams(query): QueryParams<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state
        .services
        .circulation
        .list_loans(&scope, query.filter.unwrap_or_default())
        .await?;
    Ok(Json(loans))
}

/// Get a single loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "circulation",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.circulation.get_loan(&scope, id).await?;
    Ok(Json(loan))
}
