//! Record store tests against a live PostgreSQL database
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored

use std::sync::Arc;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use storyshelf_server::{
    models::{
        book::NewBook,
        child::{ChildChanges, NewChild},
        copy::{CopyStatus, NewCopy},
        loan::{LoanFilter, NewLoan},
    },
    repository::{PgStore, RecordStore},
    AppError, TenantScope,
};

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    PgStore::new(pool)
}

/// Every test works in a fresh organization, so runs never see each other's rows.
fn scope() -> TenantScope {
    TenantScope::new(Uuid::new_v4())
}

async fn seed_copy(store: &PgStore, scope: &TenantScope) -> Uuid {
    let book = store
        .insert_book(
            scope,
            &NewBook {
                title: "Blueberries for Sal".to_string(),
                authors: vec!["Robert McCloskey".to_string()],
                isbn: None,
                cover_url: None,
                metadata: serde_json::json!({}),
            },
        )
        .await
        .expect("Failed to insert book");

    store
        .insert_copy(
            scope,
            &NewCopy {
                book_id: book.id,
                location_id: None,
                barcode: None,
                status: CopyStatus::Available,
                notes: None,
            },
        )
        .await
        .expect("Failed to insert copy")
        .id
}

fn new_loan(copy_id: Uuid, borrower: &str) -> NewLoan {
    NewLoan {
        copy_id,
        child_id: None,
        borrower_name: Some(borrower.to_string()),
        borrower_class: None,
        checked_out_at: Utc::now(),
        due_date: None,
        notes: None,
    }
}

fn new_child(emoji_id: &str) -> NewChild {
    NewChild {
        emoji_id: emoji_id.to_string(),
        name: None,
        grade_or_class: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_racing_checkouts_lend_once() {
    let store = Arc::new(store().await);
    let scope = scope();
    let copy_id = seed_copy(&store, &scope).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            let loan = new_loan(copy_id, &format!("Reader {}", i));
            tokio::spawn(async move { store.checkout(&scope, &loan).await })
        })
        .collect();

    let mut lent = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => lent += 1,
            Err(AppError::Conflict(_)) => refused += 1,
            Err(other) => panic!("unexpected checkout error: {:?}", other),
        }
    }
    assert_eq!(lent, 1);
    assert_eq!(refused, 7);

    let open = store.list_loans(&scope, LoanFilter::Active).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(store.get_copy(&scope, copy_id).await.unwrap().status, CopyStatus::CheckedOut);
}

#[tokio::test]
#[ignore]
async fn test_double_return_conflicts() {
    let store = store().await;
    let scope = scope();
    let copy_id = seed_copy(&store, &scope).await;
    let loan = store.checkout(&scope, &new_loan(copy_id, "Sam")).await.unwrap();

    let returned = store.return_loan(&scope, loan.id, Utc::now()).await.unwrap();
    assert!(!returned.is_open());

    let err = store.return_loan(&scope, loan.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == "Loan already returned"));
    assert_eq!(store.get_copy(&scope, copy_id).await.unwrap().status, CopyStatus::Available);

    let err = store.return_loan(&scope, Uuid::new_v4(), Utc::now()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore]
async fn test_checkout_classifies_missing_and_unavailable_copies() {
    let store = store().await;
    let owner = scope();
    let copy_id = seed_copy(&store, &owner).await;

    let err = store.checkout(&scope(), &new_loan(copy_id, "Eve")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    store
        .set_copy_status(&owner, copy_id, CopyStatus::Lost, Utc::now())
        .await
        .unwrap();
    let err = store.checkout(&owner, &new_loan(copy_id, "Sam")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(store.list_loans(&owner, LoanFilter::All).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_checkout_for_deleted_child_writes_nothing() {
    let store = store().await;
    let scope = scope();
    let copy_id = seed_copy(&store, &scope).await;
    let child = store.insert_child(&scope, &new_child("🦊🍩🚀")).await.unwrap();
    store.soft_delete_child(&scope, child.id, Utc::now()).await.unwrap();

    let loan = NewLoan {
        child_id: Some(child.id),
        borrower_name: None,
        ..new_loan(copy_id, "")
    };
    let err = store.checkout(&scope, &loan).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(store.get_copy(&scope, copy_id).await.unwrap().status, CopyStatus::Available);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_live_identifier_conflicts() {
    let store = store().await;
    let school = scope();

    let first = store.insert_child(&school, &new_child("🐶🌈🎨")).await.unwrap();
    let err = store.insert_child(&school, &new_child("🐶🌈🎨")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Another organization may hold the same identifier.
    store.insert_child(&scope(), &new_child("🐶🌈🎨")).await.unwrap();

    let second = store.insert_child(&school, &new_child("🐱🌺🍕")).await.unwrap();
    let changes = ChildChanges {
        emoji_id: Some("🐶🌈🎨".to_string()),
        name: None,
        grade_or_class: None,
    };
    let err = store
        .update_child(&school, second.id, &changes, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A deleted child frees its identifier.
    store.soft_delete_child(&school, first.id, Utc::now()).await.unwrap();
    store.insert_child(&school, &new_child("🐶🌈🎨")).await.unwrap();
}
