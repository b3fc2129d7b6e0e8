//! Record store layer
//!
//! Services depend on the [`RecordStore`] trait and receive an implementation
//! at construction time. Every method takes the caller's [`TenantScope`];
//! records of other organizations behave exactly like missing records.
//!
//! Two methods are units of work rather than single writes: [`RecordStore::checkout`]
//! and [`RecordStore::return_loan`]. Each pairs a conditional write with a
//! second write and either applies both or neither.

pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
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

pub use memory::{FaultPoint, MemoryStore};
pub use postgres::PgStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;

    // -------------------------------------------------------------------------
    // Books
    // -------------------------------------------------------------------------

    /// Non-deleted books, ordered by title
    async fn list_books(&self, scope: &TenantScope) -> AppResult<Vec<Book>>;

    /// Non-deleted book by id
    async fn get_book(&self, scope: &TenantScope, id: Uuid) -> AppResult<Book>;

    async fn insert_book(&self, scope: &TenantScope, book: &NewBook) -> AppResult<Book>;

    /// Idempotent soft delete
    async fn soft_delete_book(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    // -------------------------------------------------------------------------
    // Locations
    // -------------------------------------------------------------------------

    async fn list_locations(&self, scope: &TenantScope) -> AppResult<Vec<Location>>;

    async fn get_location(&self, scope: &TenantScope, id: Uuid) -> AppResult<Location>;

    async fn insert_location(&self, scope: &TenantScope, location: &CreateLocation) -> AppResult<Location>;

    // -------------------------------------------------------------------------
    // Copies
    // -------------------------------------------------------------------------

    /// Non-deleted copies of non-deleted books, newest first
    async fn list_copies(&self, scope: &TenantScope, status: Option<CopyStatus>) -> AppResult<Vec<CatalogueEntry>>;

    /// Non-deleted copy by id
    async fn get_copy(&self, scope: &TenantScope, id: Uuid) -> AppResult<BookCopy>;

    async fn insert_copy(&self, scope: &TenantScope, copy: &NewCopy) -> AppResult<BookCopy>;

    /// Catalogue status change. Conditional on the copy not being checked out;
    /// fails with `Conflict` otherwise.
    async fn set_copy_status(
        &self,
        scope: &TenantScope,
        id: Uuid,
        status: CopyStatus,
        at: DateTime<Utc>,
    ) -> AppResult<BookCopy>;

    /// Idempotent soft delete, conditional on the copy not being checked out.
    async fn soft_delete_copy(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// Non-deleted children, newest first
    async fn list_children(&self, scope: &TenantScope) -> AppResult<Vec<Child>>;

    async fn get_child(&self, scope: &TenantScope, id: Uuid) -> AppResult<Child>;

    /// Exact identifier match among non-deleted children
    async fn find_child_by_emoji(&self, scope: &TenantScope, emoji_id: &str) -> AppResult<Child>;

    /// Identifiers held by non-deleted children, optionally ignoring one child
    async fn active_emoji_ids(&self, scope: &TenantScope, exclude: Option<Uuid>) -> AppResult<HashSet<String>>;

    /// Conditional insert: fails with `Conflict` when a non-deleted child of
    /// the organization already holds the identifier.
    async fn insert_child(&self, scope: &TenantScope, child: &NewChild) -> AppResult<Child>;

    /// Conditional update: a new identifier must not be held by another
    /// non-deleted child of the organization (`Conflict`).
    async fn update_child(
        &self,
        scope: &TenantScope,
        id: Uuid,
        changes: &ChildChanges,
        at: DateTime<Utc>,
    ) -> AppResult<Child>;

    /// Idempotent soft delete
    async fn soft_delete_child(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    // -------------------------------------------------------------------------
    // Circulation
    // -------------------------------------------------------------------------

    /// Loans with copy/book/borrower details, newest checkout first
    async fn list_loans(&self, scope: &TenantScope, filter: LoanFilter) -> AppResult<Vec<LoanDetails>>;

    async fn get_loan(&self, scope: &TenantScope, id: Uuid) -> AppResult<Loan>;

    /// Unit of work: flip the copy `available -> checked_out` only if it is
    /// currently available, and insert the loan.
    ///
    /// `NotFound` when the copy, or the child named by the loan, does not
    /// resolve under the scope (or is deleted); `Conflict` when the copy is
    /// not available. Nothing is written on failure.
    async fn checkout(&self, scope: &TenantScope, loan: &NewLoan) -> AppResult<Loan>;

    /// Unit of work: close the loan only if it is open, and set its copy back
    /// to `available`.
    ///
    /// `NotFound` when the loan does not resolve; `Conflict` when it is
    /// already returned. Nothing is written on failure.
    async fn return_loan(&self, scope: &TenantScope, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<Loan>;

    // -------------------------------------------------------------------------
    // Reading journal
    // -------------------------------------------------------------------------

    /// Entries of one child whose book is not deleted, newest first
    async fn list_journal(&self, scope: &TenantScope, child_id: Uuid) -> AppResult<Vec<JournalEntryWithBook>>;

    async fn insert_journal_entry(&self, scope: &TenantScope, entry: &NewJournalEntry) -> AppResult<JournalEntry>;
}
