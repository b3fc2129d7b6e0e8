//! Books and shelf locations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, NewBook},
        location::{CreateLocation, Location},
    },
    tenant::TenantScope,
};

pub(super) async fn list(pool: &Pool<Postgres>, scope: &TenantScope) -> AppResult<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(
        "SELECT * FROM books WHERE org_id = $1 AND deleted_at IS NULL ORDER BY title",
    )
    .bind(scope.org_id())
    .fetch_all(pool)
    .await?;

    Ok(books)
}

pub(super) async fn get(pool: &Pool<Postgres>, scope: &TenantScope, id: Uuid) -> AppResult<Book> {
    sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL")
        .bind(id)
        .bind(scope.org_id())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

pub(super) async fn insert(pool: &Pool<Postgres>, scope: &TenantScope, book: &NewBook) -> AppResult<Book> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (id, org_id, title, authors, isbn, cover_url, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.org_id())
    .bind(&book.title)
    .bind(&book.authors)
    .bind(&book.isbn)
    .bind(&book.cover_url)
    .bind(&book.metadata)
    .fetch_one(pool)
    .await?;

    Ok(book)
}

pub(super) async fn soft_delete(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE books SET deleted_at = COALESCE(deleted_at, $3) WHERE id = $1 AND org_id = $2",
    )
    .bind(id)
    .bind(scope.org_id())
    .bind(at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Book {} not found", id)));
    }
    Ok(())
}

pub(super) async fn list_locations(pool: &Pool<Postgres>, scope: &TenantScope) -> AppResult<Vec<Location>> {
    let locations = sqlx::query_as::<_, Location>(
        "SELECT * FROM locations WHERE org_id = $1 AND deleted_at IS NULL ORDER BY name",
    )
    .bind(scope.org_id())
    .fetch_all(pool)
    .await?;

    Ok(locations)
}

pub(super) async fn get_location(pool: &Pool<Postgres>, scope: &TenantScope, id: Uuid) -> AppResult<Location> {
    sqlx::query_as::<_, Location>(
        "SELECT * FROM locations WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(scope.org_id())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
}

pub(super) async fn insert_location(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    location: &CreateLocation,
) -> AppResult<Location> {
    let location = sqlx::query_as::<_, Location>(
        r#"
        INSERT INTO locations (id, org_id, name, description, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.org_id())
    .bind(&location.name)
    .bind(&location.description)
    .fetch_one(pool)
    .await?;

    Ok(location)
}
