//! Child reader endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::JsonBody;
use crate::{
    error::AppResult,
    models::child::{Child, CreateChild, UpdateChild},
    tenant::TenantScope,
    AppState,
};

/// List registered children, newest first
#[utoipa::path(
    get,
    path = "/children",
    tag = "children",
    security(("organization" = [])),
    responses(
        (status = 200, description = "Registered children", body = Vec<Child>)
    )
)]
pub async fn list_children(State(state): State<AppState>, scope: TenantScope) -> AppResult<Json<Vec<Child>>> {
    let children = state.services.children.list(&scope).await?;
    Ok(Json(children))
}

/// Register a child and allocate their emoji identifier
#[utoipa::path(
    post,
    path = "/children",
    tag = "children",
    security(("organization" = [])),
    request_body = CreateChild,
    responses(
        (status = 201, description = "Child registered", body = Child),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 503, description = "No identifier could be allocated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_child(
    State(state): State<AppState>,
    scope: TenantScope,
    JsonBody(request): JsonBody<CreateChild>,
) -> AppResult<(StatusCode, Json<Child>)> {
    let child = state.services.children.register(&scope, request).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

/// Get child by ID
#[utoipa::path(
    get,
    path = "/children/{id}",
    tag = "children",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Child ID")
    ),
    responses(
        (status = 200, description = "Child details", body = Child),
        (status = 404, description = "Child not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_child(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Child>> {
    let child = state.services.children.get(&scope, id).await?;
    Ok(Json(child))
}

/// Regenerate or replace a child's identifier, or edit their details
#[utoipa::path(
    patch,
    path = "/children/{id}",
    tag = "children",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Child ID")
    ),
    request_body = UpdateChild,
    responses(
        (status = 200, description = "Child updated", body = Child),
        (status = 400, description = "Invalid identifier or option combination", body = crate::error::ErrorResponse),
        (status = 404, description = "Child not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Identifier already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_child(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateChild>,
) -> AppResult<Json<Child>> {
    let child = state.services.children.update(&scope, id, request).await?;
    Ok(Json(child))
}

/// Soft delete a child; their identifier becomes reusable
#[utoipa::path(
    delete,
    path = "/children/{id}",
    tag = "children",
    security(("organization" = [])),
    params(
        ("id" = Uuid, Path, description = "Child ID")
    ),
    responses(
        (status = 204, description = "Child deleted"),
        (status = 404, description = "Child not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_child(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.children.delete(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
