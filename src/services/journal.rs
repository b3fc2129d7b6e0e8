//! Reader lookup and reading journal

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::non_blank;
use crate::{
    error::{AppError, AppResult},
    identity::IdentityAllocator,
    models::journal::{CreateJournalEntry, JournalEntry, NewJournalEntry, ReaderJournal},
    repository::RecordStore,
    tenant::TenantScope,
};

#[derive(Clone)]
pub struct JournalService {
    store: Arc<dyn RecordStore>,
    allocator: IdentityAllocator,
}

impl JournalService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            allocator: IdentityAllocator::default(),
        }
    }

    /// Find a reader by identifier, with their journal.
    ///
    /// Malformed identifiers are answered like unknown ones and never reach
    /// the store.
    pub async fn reader_lookup(&self, scope: &TenantScope, emoji_id: &str) -> AppResult<ReaderJournal> {
        let emoji_id = emoji_id.trim();
        if !self.allocator.is_valid_format(emoji_id) {
            return Err(AppError::NotFound("Reader not found".to_string()));
        }

        let child = self.store.find_child_by_emoji(scope, emoji_id).await?;
        let entries = self.store.list_journal(scope, child.id).await?;
        Ok(ReaderJournal { child, entries })
    }

    pub async fn add_entry(&self, scope: &TenantScope, request: CreateJournalEntry) -> AppResult<JournalEntry> {
        request.validate()?;
        let child_id = required(request.child_id, "child_id")?;
        let book_id = required(request.book_id, "book_id")?;

        self.store.get_child(scope, child_id).await?;
        self.store.get_book(scope, book_id).await?;

        let entry = self
            .store
            .insert_journal_entry(
                scope,
                &NewJournalEntry {
                    child_id,
                    book_id,
                    rating: request.rating,
                    review: non_blank(request.review),
                    read_date: request.read_date,
                },
            )
            .await?;

        tracing::info!("Journal entry {} for reader {} (org {})", entry.id, child_id, scope);
        Ok(entry)
    }
}

fn required(value: Option<Uuid>, field: &str) -> AppResult<Uuid> {
    value.ok_or_else(|| AppError::validation(field, format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{book::NewBook, child::NewChild},
        repository::{MemoryStore, MockRecordStore},
    };
    use chrono::{NaiveDate, Utc};

    async fn seeded() -> (Arc<MemoryStore>, TenantScope, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let scope = TenantScope::new(Uuid::new_v4());
        let child = store
            .insert_child(
                &scope,
                &NewChild {
                    emoji_id: "🐱🌺🍕".to_string(),
                    name: Some("Lea".to_string()),
                    grade_or_class: None,
                },
            )
            .await
            .unwrap();
        let book = store
            .insert_book(
                &scope,
                &NewBook {
                    title: "Matilda".to_string(),
                    authors: vec!["Roald Dahl".to_string()],
                    isbn: None,
                    cover_url: None,
                    metadata: serde_json::json!({}),
                },
            )
            .await
            .unwrap();
        (store, scope, child.id, book.id)
    }

    fn entry(child_id: Uuid, book_id: Uuid) -> CreateJournalEntry {
        CreateJournalEntry {
            child_id: Some(child_id),
            book_id: Some(book_id),
            rating: Some(5),
            review: Some("Loved it".to_string()),
            read_date: NaiveDate::from_ymd_opt(2025, 3, 14),
        }
    }

    #[tokio::test]
    async fn test_reader_lookup_returns_journal() {
        let (store, scope, child_id, book_id) = seeded().await;
        let journal = JournalService::new(store);
        journal.add_entry(&scope, entry(child_id, book_id)).await.unwrap();

        let page = journal.reader_lookup(&scope, "🐱🌺🍕").await.unwrap();
        assert_eq!(page.child.id, child_id);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].book_title, "Matilda");
        assert_eq!(page.entries[0].entry.rating, Some(5));
    }

    #[tokio::test]
    async fn test_reader_lookup_misses() {
        let (store, scope, _, _) = seeded().await;
        let journal = JournalService::new(store);

        for candidate in ["🐶🌈🎨", "not-an-id"] {
            let err = journal.reader_lookup(&scope, candidate).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)), "{candidate}");
        }
        let other = TenantScope::new(Uuid::new_v4());
        assert!(journal.reader_lookup(&other, "🐱🌺🍕").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_identifier_never_reaches_store() {
        let mut store = MockRecordStore::new();
        store.expect_find_child_by_emoji().never();
        let journal = JournalService::new(Arc::new(store));

        let scope = TenantScope::new(Uuid::new_v4());
        assert!(journal.reader_lookup(&scope, "🐶🌈").await.is_err());
    }

    #[tokio::test]
    async fn test_add_entry_validates() {
        let (store, scope, child_id, book_id) = seeded().await;
        let journal = JournalService::new(store.clone());

        let bad_rating = CreateJournalEntry {
            rating: Some(6),
            ..entry(child_id, book_id)
        };
        assert!(matches!(journal.add_entry(&scope, bad_rating).await, Err(AppError::Validation(_))));

        let unknown_book = entry(child_id, Uuid::new_v4());
        assert!(matches!(journal.add_entry(&scope, unknown_book).await, Err(AppError::NotFound(_))));

        store.soft_delete_child(&scope, child_id, Utc::now()).await.unwrap();
        assert!(matches!(
            journal.add_entry(&scope, entry(child_id, book_id)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
