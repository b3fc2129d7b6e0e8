//! In-process record store
//!
//! Tables live behind one mutex. Units of work run against a staged view of
//! the tables that replaces the live one only when every step succeeded, so
//! a failing step leaves nothing behind. Each table is shared behind an
//! `Arc`; staging copies only the tables a unit of work writes to.
//! [`FaultPoint`]s let tests fail a chosen step on purpose.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
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

/// Second step of a unit of work that can be made to fail once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// Checkout's loan insert, after the copy has been flipped
    LoanInsert,
    /// Return's copy release, after the loan has been closed
    CopyRelease,
}

#[derive(Debug, Default, Clone)]
struct Tables {
    books: Arc<HashMap<Uuid, Book>>,
    locations: Arc<HashMap<Uuid, Location>>,
    copies: Arc<HashMap<Uuid, BookCopy>>,
    children: Arc<HashMap<Uuid, Child>>,
    loans: Arc<HashMap<Uuid, Loan>>,
    journal: Arc<HashMap<Uuid, JournalEntry>>,
}

impl Tables {
    fn books_mut(&mut self) -> &mut HashMap<Uuid, Book> {
        Arc::make_mut(&mut self.books)
    }

    fn locations_mut(&mut self) -> &mut HashMap<Uuid, Location> {
        Arc::make_mut(&mut self.locations)
    }

    fn copies_mut(&mut self) -> &mut HashMap<Uuid, BookCopy> {
        Arc::make_mut(&mut self.copies)
    }

    fn children_mut(&mut self) -> &mut HashMap<Uuid, Child> {
        Arc::make_mut(&mut self.children)
    }

    fn loans_mut(&mut self) -> &mut HashMap<Uuid, Loan> {
        Arc::make_mut(&mut self.loans)
    }

    fn journal_mut(&mut self) -> &mut HashMap<Uuid, JournalEntry> {
        Arc::make_mut(&mut self.journal)
    }

    fn live_book(&self, scope: &TenantScope, id: Uuid) -> Option<&Book> {
        self.books
            .get(&id)
            .filter(|b| scope.owns(b.org_id) && b.deleted_at.is_none())
    }

    fn live_copy(&self, scope: &TenantScope, id: Uuid) -> Option<&BookCopy> {
        self.copies
            .get(&id)
            .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none())
    }

    fn live_child(&self, scope: &TenantScope, id: Uuid) -> Option<&Child> {
        self.children
            .get(&id)
            .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none())
    }

    fn emoji_taken(&self, scope: &TenantScope, emoji_id: &str, exclude: Option<Uuid>) -> bool {
        self.children.values().any(|c| {
            scope.owns(c.org_id)
                && c.deleted_at.is_none()
                && c.emoji_id == emoji_id
                && Some(c.id) != exclude
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<HashSet<FaultPoint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next pass through `point` fail with `StoreUnavailable`.
    pub fn fail_at(&self, point: FaultPoint) {
        self.faults.lock().insert(point);
    }

    fn trip(&self, point: FaultPoint) -> AppResult<()> {
        if self.faults.lock().remove(&point) {
            return Err(AppError::StoreUnavailable(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&self.tables.lock())
    }

    fn unit_of_work<T>(&self, f: impl FnOnce(&mut Tables) -> AppResult<T>) -> AppResult<T> {
        let mut live = self.tables.lock();
        let mut staged = live.clone();
        let out = f(&mut staged)?;
        *live = staged;
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn list_books(&self, scope: &TenantScope) -> AppResult<Vec<Book>> {
        let mut books: Vec<Book> = self.read(|t| {
            t.books
                .values()
                .filter(|b| scope.owns(b.org_id) && b.deleted_at.is_none())
                .cloned()
                .collect()
        });
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn get_book(&self, scope: &TenantScope, id: Uuid) -> AppResult<Book> {
        self.read(|t| t.live_book(scope, id).cloned())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn insert_book(&self, scope: &TenantScope, book: &NewBook) -> AppResult<Book> {
        let record = Book {
            id: Uuid::new_v4(),
            org_id: scope.org_id(),
            title: book.title.clone(),
            authors: book.authors.clone(),
            isbn: book.isbn.clone(),
            cover_url: book.cover_url.clone(),
            metadata: book.metadata.clone(),
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        self.unit_of_work(|t| {
            t.books_mut().insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn soft_delete_book(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.unit_of_work(|t| {
            let book = t
                .books_mut()
                .get_mut(&id)
                .filter(|b| scope.owns(b.org_id))
                .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
            book.deleted_at.get_or_insert(at);
            Ok(())
        })
    }

    async fn list_locations(&self, scope: &TenantScope) -> AppResult<Vec<Location>> {
        let mut locations: Vec<Location> = self.read(|t| {
            t.locations
                .values()
                .filter(|l| scope.owns(l.org_id) && l.deleted_at.is_none())
                .cloned()
                .collect()
        });
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn get_location(&self, scope: &TenantScope, id: Uuid) -> AppResult<Location> {
        self.read(|t| {
            t.locations
                .get(&id)
                .filter(|l| scope.owns(l.org_id) && l.deleted_at.is_none())
                .cloned()
        })
        .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    async fn insert_location(&self, scope: &TenantScope, location: &CreateLocation) -> AppResult<Location> {
        let record = Location {
            id: Uuid::new_v4(),
            org_id: scope.org_id(),
            name: location.name.clone(),
            description: location.description.clone(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.unit_of_work(|t| {
            t.locations_mut().insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn list_copies(&self, scope: &TenantScope, status: Option<CopyStatus>) -> AppResult<Vec<CatalogueEntry>> {
        let mut entries: Vec<CatalogueEntry> = self.read(|t| {
            t.copies
                .values()
                .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none())
                .filter(|c| status.map_or(true, |s| c.status == s))
                .filter_map(|c| {
                    let book = t.live_book(scope, c.book_id)?;
                    let location_name = c
                        .location_id
                        .and_then(|id| t.locations.get(&id))
                        .map(|l| l.name.clone());
                    Some(CatalogueEntry {
                        copy: c.clone(),
                        book_title: book.title.clone(),
                        book_authors: book.authors.clone(),
                        book_isbn: book.isbn.clone(),
                        book_cover_url: book.cover_url.clone(),
                        location_name,
                    })
                })
                .collect()
        });
        entries.sort_by(|a, b| b.copy.created_at.cmp(&a.copy.created_at));
        Ok(entries)
    }

    async fn get_copy(&self, scope: &TenantScope, id: Uuid) -> AppResult<BookCopy> {
        self.read(|t| t.live_copy(scope, id).cloned())
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn insert_copy(&self, scope: &TenantScope, copy: &NewCopy) -> AppResult<BookCopy> {
        let record = BookCopy {
            id: Uuid::new_v4(),
            org_id: scope.org_id(),
            book_id: copy.book_id,
            location_id: copy.location_id,
            barcode: copy.barcode.clone(),
            status: copy.status,
            notes: copy.notes.clone(),
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        self.unit_of_work(|t| {
            t.copies_mut().insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn set_copy_status(
        &self,
        scope: &TenantScope,
        id: Uuid,
        status: CopyStatus,
        at: DateTime<Utc>,
    ) -> AppResult<BookCopy> {
        self.unit_of_work(|t| {
            let copy = t
                .copies_mut()
                .get_mut(&id)
                .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none())
                .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))?;
            if copy.status == CopyStatus::CheckedOut {
                return Err(AppError::Conflict("Copy is checked out".to_string()));
            }
            copy.status = status;
            copy.updated_at = Some(at);
            Ok(copy.clone())
        })
    }

    async fn soft_delete_copy(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.unit_of_work(|t| {
            let copy = t
                .copies_mut()
                .get_mut(&id)
                .filter(|c| scope.owns(c.org_id))
                .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))?;
            if copy.deleted_at.is_some() {
                return Ok(());
            }
            if copy.status == CopyStatus::CheckedOut {
                return Err(AppError::Conflict("Copy is checked out".to_string()));
            }
            copy.deleted_at = Some(at);
            Ok(())
        })
    }

    async fn list_children(&self, scope: &TenantScope) -> AppResult<Vec<Child>> {
        let mut children: Vec<Child> = self.read(|t| {
            t.children
                .values()
                .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none())
                .cloned()
                .collect()
        });
        children.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(children)
    }

    async fn get_child(&self, scope: &TenantScope, id: Uuid) -> AppResult<Child> {
        self.read(|t| t.live_child(scope, id).cloned())
            .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))
    }

    async fn find_child_by_emoji(&self, scope: &TenantScope, emoji_id: &str) -> AppResult<Child> {
        self.read(|t| {
            t.children
                .values()
                .find(|c| scope.owns(c.org_id) && c.deleted_at.is_none() && c.emoji_id == emoji_id)
                .cloned()
        })
        .ok_or_else(|| AppError::NotFound("Reader not found".to_string()))
    }

    async fn active_emoji_ids(&self, scope: &TenantScope, exclude: Option<Uuid>) -> AppResult<HashSet<String>> {
        Ok(self.read(|t| {
            t.children
                .values()
                .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none() && Some(c.id) != exclude)
                .map(|c| c.emoji_id.clone())
                .collect()
        }))
    }

    async fn insert_child(&self, scope: &TenantScope, child: &NewChild) -> AppResult<Child> {
        self.unit_of_work(|t| {
            if t.emoji_taken(scope, &child.emoji_id, None) {
                return Err(AppError::Conflict("Identifier already in use".to_string()));
            }
            let record = Child {
                id: Uuid::new_v4(),
                org_id: scope.org_id(),
                emoji_id: child.emoji_id.clone(),
                name: child.name.clone(),
                grade_or_class: child.grade_or_class.clone(),
                created_at: Utc::now(),
                updated_at: None,
                deleted_at: None,
            };
            t.children_mut().insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn update_child(
        &self,
        scope: &TenantScope,
        id: Uuid,
        changes: &ChildChanges,
        at: DateTime<Utc>,
    ) -> AppResult<Child> {
        self.unit_of_work(|t| {
            if t.live_child(scope, id).is_none() {
                return Err(AppError::NotFound(format!("Child {} not found", id)));
            }
            if let Some(ref emoji_id) = changes.emoji_id {
                if t.emoji_taken(scope, emoji_id, Some(id)) {
                    return Err(AppError::Conflict("Identifier already in use".to_string()));
                }
            }
            let child = t
                .children_mut()
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))?;
            if let Some(ref emoji_id) = changes.emoji_id {
                child.emoji_id = emoji_id.clone();
            }
            if let Some(ref name) = changes.name {
                child.name = Some(name.clone());
            }
            if let Some(ref grade) = changes.grade_or_class {
                child.grade_or_class = Some(grade.clone());
            }
            child.updated_at = Some(at);
            Ok(child.clone())
        })
    }

    async fn soft_delete_child(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.unit_of_work(|t| {
            let child = t
                .children_mut()
                .get_mut(&id)
                .filter(|c| scope.owns(c.org_id))
                .ok_or_else(|| AppError::NotFound(format!("Child {} not found", id)))?;
            child.deleted_at.get_or_insert(at);
            Ok(())
        })
    }

    async fn list_loans(&self, scope: &TenantScope, filter: LoanFilter) -> AppResult<Vec<LoanDetails>> {
        let mut loans: Vec<LoanDetails> = self.read(|t| {
            t.loans
                .values()
                .filter(|l| scope.owns(l.org_id) && filter.matches(l))
                .filter_map(|l| {
                    let copy = t.copies.get(&l.copy_id)?;
                    let book = t.books.get(&copy.book_id)?;
                    let child = l.child_id.and_then(|id| t.children.get(&id));
                    Some(LoanDetails {
                        loan: l.clone(),
                        book_id: book.id,
                        book_title: book.title.clone(),
                        copy_barcode: copy.barcode.clone(),
                        child_emoji_id: child.map(|c| c.emoji_id.clone()),
                        child_name: child.and_then(|c| c.name.clone()),
                    })
                })
                .collect()
        });
        loans.sort_by(|a, b| b.loan.checked_out_at.cmp(&a.loan.checked_out_at));
        Ok(loans)
    }

    async fn get_loan(&self, scope: &TenantScope, id: Uuid) -> AppResult<Loan> {
        self.read(|t| t.loans.get(&id).filter(|l| scope.owns(l.org_id)).cloned())
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    async fn checkout(&self, scope: &TenantScope, loan: &NewLoan) -> AppResult<Loan> {
        self.unit_of_work(|t| {
            if let Some(child_id) = loan.child_id {
                if t.live_child(scope, child_id).is_none() {
                    return Err(AppError::NotFound(format!("Child {} not found", child_id)));
                }
            }
            let copy = t
                .copies_mut()
                .get_mut(&loan.copy_id)
                .filter(|c| scope.owns(c.org_id) && c.deleted_at.is_none())
                .ok_or_else(|| AppError::NotFound("Copy not found".to_string()))?;
            if copy.status != CopyStatus::Available {
                return Err(AppError::Conflict("Copy is not available".to_string()));
            }
            copy.status = CopyStatus::CheckedOut;
            copy.updated_at = Some(loan.checked_out_at);

            self.trip(FaultPoint::LoanInsert)?;
            if t.loans.values().any(|l| l.copy_id == loan.copy_id && l.is_open()) {
                return Err(AppError::Conflict("Copy already has an open loan".to_string()));
            }
            let record = Loan {
                id: Uuid::new_v4(),
                org_id: scope.org_id(),
                copy_id: loan.copy_id,
                child_id: loan.child_id,
                borrower_name: loan.borrower_name.clone(),
                borrower_class: loan.borrower_class.clone(),
                checked_out_at: loan.checked_out_at,
                due_date: loan.due_date,
                returned_at: None,
                notes: loan.notes.clone(),
                created_at: loan.checked_out_at,
            };
            t.loans_mut().insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn return_loan(&self, scope: &TenantScope, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<Loan> {
        self.unit_of_work(|t| {
            let loan = t
                .loans_mut()
                .get_mut(&loan_id)
                .filter(|l| scope.owns(l.org_id))
                .ok_or_else(|| AppError::NotFound("Loan not found".to_string()))?;
            if !loan.is_open() {
                return Err(AppError::Conflict("Loan already returned".to_string()));
            }
            loan.returned_at = Some(at);
            let closed = loan.clone();

            self.trip(FaultPoint::CopyRelease)?;
            if let Some(copy) = t
                .copies_mut()
                .get_mut(&closed.copy_id)
                .filter(|c| scope.owns(c.org_id))
            {
                copy.status = CopyStatus::Available;
                copy.updated_at = Some(at);
            }
            Ok(closed)
        })
    }

    async fn list_journal(&self, scope: &TenantScope, child_id: Uuid) -> AppResult<Vec<JournalEntryWithBook>> {
        let mut entries: Vec<JournalEntryWithBook> = self.read(|t| {
            t.journal
                .values()
                .filter(|e| scope.owns(e.org_id) && e.child_id == child_id)
                .filter_map(|e| {
                    let book = t.live_book(scope, e.book_id)?;
                    Some(JournalEntryWithBook {
                        entry: e.clone(),
                        book_title: book.title.clone(),
                        book_authors: book.authors.clone(),
                        book_cover_url: book.cover_url.clone(),
                    })
                })
                .collect()
        });
        entries.sort_by(|a, b| b.entry.created_at.cmp(&a.entry.created_at));
        Ok(entries)
    }

    async fn insert_journal_entry(&self, scope: &TenantScope, entry: &NewJournalEntry) -> AppResult<JournalEntry> {
        let record = JournalEntry {
            id: Uuid::new_v4(),
            org_id: scope.org_id(),
            child_id: entry.child_id,
            book_id: entry.book_id,
            rating: entry.rating,
            review: entry.review.clone(),
            read_date: entry.read_date,
            created_at: Utc::now(),
        };
        self.unit_of_work(|t| {
            t.journal_mut().insert(record.id, record.clone());
            Ok(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> TenantScope {
        TenantScope::new(Uuid::new_v4())
    }

    async fn seed_copy(store: &MemoryStore, scope: &TenantScope) -> BookCopy {
        let book = store
            .insert_book(
                scope,
                &NewBook {
                    title: "Frog and Toad".to_string(),
                    authors: vec!["Arnold Lobel".to_string()],
                    isbn: None,
                    cover_url: None,
                    metadata: serde_json::json!({}),
                },
            )
            .await
            .unwrap();
        store
            .insert_copy(
                scope,
                &NewCopy {
                    book_id: book.id,
                    location_id: None,
                    barcode: Some("B-1".to_string()),
                    status: CopyStatus::Available,
                    notes: None,
                },
            )
            .await
            .unwrap()
    }

    fn new_loan(copy_id: Uuid) -> NewLoan {
        NewLoan {
            copy_id,
            child_id: None,
            borrower_name: Some("Sam".to_string()),
            borrower_class: None,
            checked_out_at: Utc::now(),
            due_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_failed_loan_insert_leaves_copy_available() {
        let store = MemoryStore::new();
        let scope = scope();
        let copy = seed_copy(&store, &scope).await;

        store.fail_at(FaultPoint::LoanInsert);
        let err = store.checkout(&scope, &new_loan(copy.id)).await.unwrap_err();
        assert!(err.is_retryable());

        assert_eq!(store.get_copy(&scope, copy.id).await.unwrap().status, CopyStatus::Available);
        assert!(store.list_loans(&scope, LoanFilter::All).await.unwrap().is_empty());

        // The fault fires once; a retry goes through.
        store.checkout(&scope, &new_loan(copy.id)).await.unwrap();
        assert_eq!(store.get_copy(&scope, copy.id).await.unwrap().status, CopyStatus::CheckedOut);
    }

    #[tokio::test]
    async fn test_failed_copy_release_leaves_loan_open() {
        let store = MemoryStore::new();
        let scope = scope();
        let copy = seed_copy(&store, &scope).await;
        let loan = store.checkout(&scope, &new_loan(copy.id)).await.unwrap();

        store.fail_at(FaultPoint::CopyRelease);
        assert!(store.return_loan(&scope, loan.id, Utc::now()).await.is_err());

        assert!(store.get_loan(&scope, loan.id).await.unwrap().is_open());
        assert_eq!(store.get_copy(&scope, copy.id).await.unwrap().status, CopyStatus::CheckedOut);

        store.return_loan(&scope, loan.id, Utc::now()).await.unwrap();
        assert_eq!(store.get_copy(&scope, copy.id).await.unwrap().status, CopyStatus::Available);
    }

    #[tokio::test]
    async fn test_other_tenant_sees_nothing() {
        let store = MemoryStore::new();
        let owner = scope();
        let stranger = scope();
        let copy = seed_copy(&store, &owner).await;
        let loan = store.checkout(&owner, &new_loan(copy.id)).await.unwrap();

        assert!(matches!(store.get_copy(&stranger, copy.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.checkout(&stranger, &new_loan(copy.id)).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.return_loan(&stranger, loan.id, Utc::now()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.list_copies(&stranger, None).await.unwrap().is_empty());
        assert!(store.get_loan(&owner, loan.id).await.unwrap().is_open());
    }

    #[tokio::test]
    async fn test_emoji_uniqueness_ignores_deleted_children() {
        let store = MemoryStore::new();
        let scope = scope();
        let child = NewChild {
            emoji_id: "🐶🌈🎨".to_string(),
            name: None,
            grade_or_class: None,
        };
        let first = store.insert_child(&scope, &child).await.unwrap();
        assert!(matches!(store.insert_child(&scope, &child).await, Err(AppError::Conflict(_))));

        store.soft_delete_child(&scope, first.id, Utc::now()).await.unwrap();
        store.insert_child(&scope, &child).await.unwrap();
        assert_eq!(store.active_emoji_ids(&scope, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_catalogue_status_change_respects_open_loans() {
        let store = MemoryStore::new();
        let scope = scope();
        let copy = seed_copy(&store, &scope).await;
        store.checkout(&scope, &new_loan(copy.id)).await.unwrap();

        let err = store
            .set_copy_status(&scope, copy.id, CopyStatus::Lost, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(matches!(
            store.soft_delete_copy(&scope, copy.id, Utc::now()).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_for_deleted_child_writes_nothing() {
        let store = MemoryStore::new();
        let scope = scope();
        let copy = seed_copy(&store, &scope).await;
        let child = store
            .insert_child(
                &scope,
                &NewChild {
                    emoji_id: "🦊🍩🚀".to_string(),
                    name: None,
                    grade_or_class: None,
                },
            )
            .await
            .unwrap();
        store.soft_delete_child(&scope, child.id, Utc::now()).await.unwrap();

        let loan = NewLoan {
            child_id: Some(child.id),
            borrower_name: None,
            ..new_loan(copy.id)
        };
        assert!(matches!(store.checkout(&scope, &loan).await, Err(AppError::NotFound(_))));
        assert_eq!(store.get_copy(&scope, copy.id).await.unwrap().status, CopyStatus::Available);
        assert!(store.list_loans(&scope, LoanFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_share_untouched_tables() {
        let store = MemoryStore::new();
        let scope = scope();
        let copy = seed_copy(&store, &scope).await;

        let before = store.tables.lock().clone();
        store.checkout(&scope, &new_loan(copy.id)).await.unwrap();
        let after = store.tables.lock().clone();

        assert!(Arc::ptr_eq(&before.books, &after.books));
        assert!(Arc::ptr_eq(&before.children, &after.children));
        assert!(Arc::ptr_eq(&before.journal, &after.journal));
        assert!(!Arc::ptr_eq(&before.copies, &after.copies));
        assert!(!Arc::ptr_eq(&before.loans, &after.loans));
        assert_eq!(before.copies[&copy.id].status, CopyStatus::Available);
    }
}
