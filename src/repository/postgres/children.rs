//! Children (anonymous readers)

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::conflict_on_unique;
use crate::{
    error::{AppError, AppResult},
    models::child::{Child, ChildChanges, NewChild},
    tenant::TenantScope,
};

const IDENTIFIER_TAKEN: &str = "Identifier already in use";

pub(super) async fn list(pool: &Pool<Postgres>, scope: &TenantScope) -> AppResult<Vec<Child>> {
    let children = sqlx::query_as::<_, Child>(
        "SELECT * FROM children WHERE org_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
    )
    .bind(scope.org_id())
    .fetch_all(pool)
    .await?;

    Ok(children)
}

pub(super) async fn get(pool: &Pool<Postgres>, scope: &TenantScope, id: Uuid) -> AppResult<Child> {
    sqlx::query_as::<_, Child>("SELECT * FROM children WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL")
        .bind(id)
        .bind(scope.org_id())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))
}

pub(super) async fn find_by_emoji(pool: &Pool<Postgres>, scope: &TenantScope, emoji_id: &str) -> AppResult<Child> {
    sqlx::query_as::<_, Child>(
        "SELECT * FROM children WHERE org_id = $1 AND emoji_id = $2 AND deleted_at IS NULL",
    )
    .bind(scope.org_id())
    .bind(emoji_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Reader not found".to_string()))
}

pub(super) async fn active_emoji_ids(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    exclude: Option<Uuid>,
) -> AppResult<HashSet<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT emoji_id FROM children
        WHERE org_id = $1 AND deleted_at IS NULL AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(scope.org_id())
    .bind(exclude)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().collect())
}

pub(super) async fn insert(pool: &Pool<Postgres>, scope: &TenantScope, child: &NewChild) -> AppResult<Child> {
    sqlx::query_as::<_, Child>(
        r#"
        INSERT INTO children (id, org_id, emoji_id, name, grade_or_class, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.org_id())
    .bind(&child.emoji_id)
    .bind(&child.name)
    .bind(&child.grade_or_class)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, IDENTIFIER_TAKEN))
}

pub(super) async fn update(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    id: Uuid,
    changes: &ChildChanges,
    at: DateTime<Utc>,
) -> AppResult<Child> {
    sqlx::query_as::<_, Child>(
        r#"
        UPDATE children SET
            emoji_id = COALESCE($3, emoji_id),
            name = COALESCE($4, name),
            grade_or_class = COALESCE($5, grade_or_class),
            updated_at = $6
        WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(scope.org_id())
    .bind(&changes.emoji_id)
    .bind(&changes.name)
    .bind(&changes.grade_or_class)
    .bind(at)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, IDENTIFIER_TAKEN))?
    .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))
}

pub(super) async fn soft_delete(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE children SET deleted_at = COALESCE(deleted_at, $3) WHERE id = $1 AND org_id = $2",
    )
    .bind(id)
    .bind(scope.org_id())
    .bind(at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Child {} not found", id)));
    }
    Ok(())
}
