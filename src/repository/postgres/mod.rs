//! PostgreSQL record store
//!
//! Queries are grouped per domain in the submodules as free functions over
//! the pool; [`PgStore`] only wires them to [`RecordStore`]. Uniqueness of
//! live reader identifiers and of open loans per copy is enforced by partial
//! unique indexes; violations surface as `Conflict`.

mod books;
mod children;
mod copies;
mod journal;
mod loans;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, NewBook},
        child::{Child, ChildChanges, NewChild},
        copy::{BookCopy, CatalogueEntry, CopyStatus, NewCopy},
        journal::{JournalEntry, JournalEntryWithBook, NewJournalEntry},
        loan::{Loan, LoanDetails, LoanFilter, NewLoan},
        location::{CreateLocation, Location},
    },
    tenant::TenantScope,
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

/// Map a unique-index violation to `Conflict`, anything else as usual.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(message.to_string()),
        other => other.into(),
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_books(&self, scope: &TenantScope) -> AppResult<Vec<Book>> {
        books::list(&self.pool, scope).await
    }

    async fn get_book(&self, scope: &TenantScope, id: Uuid) -> AppResult<Book> {
        books::get(&self.pool, scope, id).await
    }

    async fn insert_book(&self, scope: &TenantScope, book: &NewBook) -> AppResult<Book> {
        books::insert(&self.pool, scope, book).await
    }

    async fn soft_delete_book(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        books::soft_delete(&self.pool, scope, id, at).await
    }

    async fn list_locations(&self, scope: &TenantScope) -> AppResult<Vec<Location>> {
        books::list_locations(&self.pool, scope).await
    }

    async fn get_location(&self, scope: &TenantScope, id: Uuid) -> AppResult<Location> {
        books::get_location(&self.pool, scope, id).await
    }

    async fn insert_location(&self, scope: &TenantScope, location: &CreateLocation) -> AppResult<Location> {
        books::insert_location(&self.pool, scope, location).await
    }

    async fn list_copies(&self, scope: &TenantScope, status: Option<CopyStatus>) -> AppResult<Vec<CatalogueEntry>> {
        copies::list(&self.pool, scope, status).await
    }

    async fn get_copy(&self, scope: &TenantScope, id: Uuid) -> AppResult<BookCopy> {
        copies::get(&self.pool, scope, id).await
    }

    async fn insert_copy(&self, scope: &TenantScope, copy: &NewCopy) -> AppResult<BookCopy> {
        copies::insert(&self.pool, scope, copy).await
    }

    async fn set_copy_status(
        &self,
        scope: &TenantScope,
        id: Uuid,
        status: CopyStatus,
        at: DateTime<Utc>,
    ) -> AppResult<BookCopy> {
        copies::set_status(&self.pool, scope, id, status, at).await
    }

    async fn soft_delete_copy(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        copies::soft_delete(&self.pool, scope, id, at).await
    }

    async fn list_children(&self, scope: &TenantScope) -> AppResult<Vec<Child>> {
        children::list(&self.pool, scope).await
    }

    async fn get_child(&self, scope: &TenantScope, id: Uuid) -> AppResult<Child> {
        children::get(&self.pool, scope, id).await
    }

    async fn find_child_by_emoji(&self, scope: &TenantScope, emoji_id: &str) -> AppResult<Child> {
        children::find_by_emoji(&self.pool, scope, emoji_id).await
    }

    async fn active_emoji_ids(&self, scope: &TenantScope, exclude: Option<Uuid>) -> AppResult<HashSet<String>> {
        children::active_emoji_ids(&self.pool, scope, exclude).await
    }

    async fn insert_child(&self, scope: &TenantScope, child: &NewChild) -> AppResult<Child> {
        children::insert(&self.pool, scope, child).await
    }

    async fn update_child(
        &self,
        scope: &TenantScope,
        id: Uuid,
        changes: &ChildChanges,
        at: DateTime<Utc>,
    ) -> AppResult<Child> {
        children::update(&self.pool, scope, id, changes, at).await
    }

    async fn soft_delete_child(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        children::soft_delete(&self.pool, scope, id, at).await
    }

    async fn list_loans(&self, scope: &TenantScope, filter: LoanFilter) -> AppResult<Vec<LoanDetails>> {
        loans::list(&self.pool, scope, filter).await
    }

    async fn get_loan(&self, scope: &TenantScope, id: Uuid) -> AppResult<Loan> {
        loans::get(&self.pool, scope, id).await
    }

    async fn checkout(&self, scope: &TenantScope, loan: &NewLoan) -> AppResult<Loan> {
        loans::checkout(&self.pool, scope, loan).await
    }

    async fn return_loan(&self, scope: &TenantScope, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<Loan> {
        loans::return_loan(&self.pool, scope, loan_id, at).await
    }

    async fn list_journal(&self, scope: &TenantScope, child_id: Uuid) -> AppResult<Vec<JournalEntryWithBook>> {
        journal::list(&self.pool, scope, child_id).await
    }

    async fn insert_journal_entry(&self, scope: &TenantScope, entry: &NewJournalEntry) -> AppResult<JournalEntry> {
        journal::insert(&self.pool, scope, entry).await
    }
}
