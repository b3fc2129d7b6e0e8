//! Catalog management service: books, shelf locations and physical copies

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::non_blank;
use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{
        book::{Book, CreateBook, NewBook},
        copy::{BookCopy, CatalogueEntry, CopyStatus, CreateCopy, NewCopy},
        location::{CreateLocation, Location},
    },
    repository::RecordStore,
    tenant::TenantScope,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // -------------------------------------------------------------------------
    // Books
    // -------------------------------------------------------------------------

    pub async fn list_books(&self, scope: &TenantScope) -> AppResult<Vec<Book>> {
        self.store.list_books(scope).await
    }

    pub async fn get_book(&self, scope: &TenantScope, id: Uuid) -> AppResult<Book> {
        self.store.get_book(scope, id).await
    }

    pub async fn create_book(&self, scope: &TenantScope, book: CreateBook) -> AppResult<Book> {
        let mut errors = FieldErrors::from_validation(book.validate());

        let title = book.title.trim().to_string();
        if title.is_empty() && errors.fields().iter().all(|e| e.field != "title") {
            errors.push("title", "Title is required");
        }
        let authors: Vec<String> = book
            .authors
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if authors.is_empty() && errors.fields().iter().all(|e| e.field != "authors") {
            errors.push("authors", "At least one author is required");
        }
        let metadata = book.metadata.unwrap_or_else(|| serde_json::json!({}));
        if !metadata.is_object() {
            errors.push("metadata", "Metadata must be a JSON object");
        }
        errors.into_result()?;

        let book = self
            .store
            .insert_book(
                scope,
                &NewBook {
                    title,
                    authors,
                    isbn: non_blank(book.isbn),
                    cover_url: non_blank(book.cover_url),
                    metadata,
                },
            )
            .await?;

        tracing::info!("Created book {} '{}' (org {})", book.id, book.title, scope);
        Ok(book)
    }

    pub async fn delete_book(&self, scope: &TenantScope, id: Uuid) -> AppResult<()> {
        self.store.soft_delete_book(scope, id, Utc::now()).await?;
        tracing::info!("Deleted book {} (org {})", id, scope);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Locations
    // -------------------------------------------------------------------------

    pub async fn list_locations(&self, scope: &TenantScope) -> AppResult<Vec<Location>> {
        self.store.list_locations(scope).await
    }

    pub async fn create_location(&self, scope: &TenantScope, location: CreateLocation) -> AppResult<Location> {
        location.validate()?;
        let name = location.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("name", "Name is required"));
        }

        self.store
            .insert_location(
                scope,
                &CreateLocation {
                    name,
                    description: non_blank(location.description),
                },
            )
            .await
    }

    // -------------------------------------------------------------------------
    // Copies
    // -------------------------------------------------------------------------

    /// Catalogue view: copies with their book and location, optionally by status
    pub async fn list_copies(&self, scope: &TenantScope, status: Option<CopyStatus>) -> AppResult<Vec<CatalogueEntry>> {
        self.store.list_copies(scope, status).await
    }

    pub async fn get_copy(&self, scope: &TenantScope, id: Uuid) -> AppResult<BookCopy> {
        self.store.get_copy(scope, id).await
    }

    /// Add a physical copy of a book. A copy can only enter circulation
    /// through a checkout, so it cannot be created as `checked_out`.
    pub async fn create_copy(&self, scope: &TenantScope, copy: CreateCopy) -> AppResult<BookCopy> {
        let mut errors = FieldErrors::from_validation(copy.validate());
        let status = copy.status.unwrap_or(CopyStatus::Available);
        if status == CopyStatus::CheckedOut {
            errors.push("status", "A new copy cannot be checked out");
        }
        errors.into_result()?;

        let book_id = copy
            .book_id
            .ok_or_else(|| AppError::validation("book_id", "book_id is required"))?;
        self.store.get_book(scope, book_id).await?;
        if let Some(location_id) = copy.location_id {
            self.store.get_location(scope, location_id).await?;
        }

        let copy = self
            .store
            .insert_copy(
                scope,
                &NewCopy {
                    book_id,
                    location_id: copy.location_id,
                    barcode: non_blank(copy.barcode),
                    status,
                    notes: non_blank(copy.notes),
                },
            )
            .await?;

        tracing::info!("Added copy {} of book {} (org {})", copy.id, book_id, scope);
        Ok(copy)
    }

    /// Mark a copy lost, damaged or available again. Copies on loan are
    /// owned by circulation and are rejected with `Conflict`.
    pub async fn set_copy_status(&self, scope: &TenantScope, id: Uuid, status: CopyStatus) -> AppResult<BookCopy> {
        if status == CopyStatus::CheckedOut {
            return Err(AppError::validation("status", "Use checkout to lend a copy"));
        }

        let copy = self.store.set_copy_status(scope, id, status, Utc::now()).await?;
        tracing::info!("Copy {} marked {} (org {})", id, status, scope);
        Ok(copy)
    }

    pub async fn delete_copy(&self, scope: &TenantScope, id: Uuid) -> AppResult<()> {
        self.store.soft_delete_copy(scope, id, Utc::now()).await?;
        tracing::info!("Deleted copy {} (org {})", id, scope);
        Ok(())
    }
}
