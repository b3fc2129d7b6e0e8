//! Physical copies and the catalogue view

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::copy::{BookCopy, CatalogueEntry, CopyStatus, NewCopy},
    tenant::TenantScope,
};

pub(super) async fn list(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    status: Option<CopyStatus>,
) -> AppResult<Vec<CatalogueEntry>> {
    let entries = sqlx::query_as::<_, CatalogueEntry>(
        r#"
        SELECT c.*,
               b.title AS book_title, b.authors AS book_authors,
               b.isbn AS book_isbn, b.cover_url AS book_cover_url,
               l.name AS location_name
        FROM copies c
        JOIN books b ON b.id = c.book_id AND b.deleted_at IS NULL
        LEFT JOIN locations l ON l.id = c.location_id
        WHERE c.org_id = $1
          AND c.deleted_at IS NULL
          AND ($2::copy_status IS NULL OR c.status = $2)
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(scope.org_id())
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub(super) async fn get(pool: &Pool<Postgres>, scope: &TenantScope, id: Uuid) -> AppResult<BookCopy> {
    sqlx::query_as::<_, BookCopy>("SELECT * FROM copies WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL")
        .bind(id)
        .bind(scope.org_id())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
}

pub(super) async fn insert(pool: &Pool<Postgres>, scope: &TenantScope, copy: &NewCopy) -> AppResult<BookCopy> {
    let copy = sqlx::query_as::<_, BookCopy>(
        r#"
        INSERT INTO copies (id, org_id, book_id, location_id, barcode, status, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.org_id())
    .bind(copy.book_id)
    .bind(copy.location_id)
    .bind(&copy.barcode)
    .bind(copy.status)
    .bind(&copy.notes)
    .fetch_one(pool)
    .await?;

    Ok(copy)
}

/// Status of a copy resolving under the scope, deleted or not
async fn probe(pool: &Pool<Postgres>, scope: &TenantScope, id: Uuid) -> AppResult<Option<(CopyStatus, bool)>> {
    let row = sqlx::query_as::<_, (CopyStatus, bool)>(
        "SELECT status, deleted_at IS NOT NULL FROM copies WHERE id = $1 AND org_id = $2",
    )
    .bind(id)
    .bind(scope.org_id())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub(super) async fn set_status(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    id: Uuid,
    status: CopyStatus,
    at: DateTime<Utc>,
) -> AppResult<BookCopy> {
    let updated = sqlx::query_as::<_, BookCopy>(
        r#"
        UPDATE copies SET status = $3, updated_at = $4
        WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL AND status <> 'checked_out'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(scope.org_id())
    .bind(status)
    .bind(at)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(copy) => Ok(copy),
        None => match probe(pool, scope, id).await? {
            Some((_, false)) => Err(AppError::Conflict("Copy is checked out".to_string())),
            _ => Err(AppError::NotFound(format!("Copy {} not found", id))),
        },
    }
}

pub(super) async fn soft_delete(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE copies SET deleted_at = $3
        WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL AND status <> 'checked_out'
        "#,
    )
    .bind(id)
    .bind(scope.org_id())
    .bind(at)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }
    match probe(pool, scope, id).await? {
        None => Err(AppError::NotFound(format!("Copy {} not found", id))),
        Some((_, true)) => Ok(()),
        Some(_) => Err(AppError::Conflict("Copy is checked out".to_string())),
    }
}
