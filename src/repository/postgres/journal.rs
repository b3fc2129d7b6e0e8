//! Reading journal

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::journal::{JournalEntry, JournalEntryWithBook, NewJournalEntry},
    tenant::TenantScope,
};

pub(super) async fn list(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    child_id: Uuid,
) -> AppResult<Vec<JournalEntryWithBook>> {
    let entries = sqlx::query_as::<_, JournalEntryWithBook>(
        r#"
        SELECT j.*,
               b.title AS book_title, b.authors AS book_authors, b.cover_url AS book_cover_url
        FROM reading_journal j
        JOIN books b ON b.id = j.book_id AND b.deleted_at IS NULL
        WHERE j.org_id = $1 AND j.child_id = $2
        ORDER BY j.created_at DESC
        "#,
    )
    .bind(scope.org_id())
    .bind(child_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub(super) async fn insert(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    entry: &NewJournalEntry,
) -> AppResult<JournalEntry> {
    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO reading_journal (id, org_id, child_id, book_id, rating, review, read_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.org_id())
    .bind(entry.child_id)
    .bind(entry.book_id)
    .bind(entry.rating)
    .bind(&entry.review)
    .bind(entry.read_date)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}
