//! Circulation: checkout and return of physical copies
//!
//! A copy is `checked_out` exactly while it has an open loan. Both operations
//! are delegated to a single store unit of work, so a concurrent caller either
//! sees the whole transition or none of it.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::non_blank;
use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::loan::{CheckoutRequest, Loan, LoanDetails, LoanFilter, NewLoan, ReturnRequest},
    repository::RecordStore,
    tenant::TenantScope,
};

#[derive(Clone)]
pub struct CirculationService {
    store: Arc<dyn RecordStore>,
}

impl CirculationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Lend a copy to a child or a named borrower.
    ///
    /// The child id, when given, is authoritative and must resolve under the
    /// scope. Fails with `Conflict` when the copy is not available.
    pub async fn checkout(&self, scope: &TenantScope, request: CheckoutRequest) -> AppResult<Loan> {
        let now = Utc::now();
        let borrower_name = non_blank(request.borrower_name.clone());

        let mut errors = FieldErrors::from_validation(request.validate());
        if request.child_id.is_none() && borrower_name.is_none() {
            errors.push("child_id", "A child or a borrower name is required");
            errors.push("borrower_name", "A child or a borrower name is required");
        }
        if let Some(due_date) = request.due_date {
            if due_date.date_naive() < now.date_naive() {
                errors.push("due_date", "Due date cannot be in the past");
            }
        }
        errors.into_result()?;

        let copy_id = request
            .copy_id
            .ok_or_else(|| AppError::validation("copy_id", "copy_id is required"))?;

        // Early answer for unknown children; the store checks again inside the unit of work.
        if let Some(child_id) = request.child_id {
            self.store.get_child(scope, child_id).await?;
        }

        let loan = self
            .store
            .checkout(
                scope,
                &NewLoan {
                    copy_id,
                    child_id: request.child_id,
                    borrower_name,
                    borrower_class: non_blank(request.borrower_class),
                    checked_out_at: now,
                    due_date: request.due_date,
                    notes: non_blank(request.notes),
                },
            )
            .await?;

        tracing::info!("Copy {} checked out as loan {} (org {})", copy_id, loan.id, scope);
        Ok(loan)
    }

    /// Close an open loan and put its copy back on the shelf.
    ///
    /// Not idempotent: returning a closed loan fails with `Conflict`.
    pub async fn return_loan(&self, scope: &TenantScope, request: ReturnRequest) -> AppResult<Loan> {
        request.validate()?;
        let loan_id = request
            .loan_id
            .ok_or_else(|| AppError::validation("loan_id", "loan_id is required"))?;

        let loan = self.store.return_loan(scope, loan_id, Utc::now()).await?;

        tracing::info!("Loan {} returned, copy {} available (org {})", loan.id, loan.copy_id, scope);
        Ok(loan)
    }

    pub async fn get_loan(&self, scope: &TenantScope, id: Uuid) -> AppResult<Loan> {
        self.store.get_loan(scope, id).await
    }

    pub async fn list_loans(&self, scope: &TenantScope, filter: LoanFilter) -> AppResult<Vec<LoanDetails>> {
        self.store.list_loans(scope, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            book::NewBook,
            child::{Child, NewChild},
            copy::{CopyStatus, NewCopy},
        },
        repository::{FaultPoint, MemoryStore, MockRecordStore},
    };
    use chrono::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: CirculationService,
        scope: TenantScope,
        copy_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let scope = TenantScope::new(Uuid::new_v4());
        let copy_id = seed_copy(&store, &scope).await;
        Fixture {
            service: CirculationService::new(store.clone()),
            store,
            scope,
            copy_id,
        }
    }

    async fn seed_copy(store: &MemoryStore, scope: &TenantScope) -> Uuid {
        let book = store
            .insert_book(
                scope,
                &NewBook {
                    title: "Where the Wild Things Are".to_string(),
                    authors: vec!["Maurice Sendak".to_string()],
                    isbn: Some("9780060254926".to_string()),
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
                    barcode: None,
                    status: CopyStatus::Available,
                    notes: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn seed_child(store: &MemoryStore, scope: &TenantScope, emoji_id: &str) -> Child {
        store
            .insert_child(
                scope,
                &NewChild {
                    emoji_id: emoji_id.to_string(),
                    name: None,
                    grade_or_class: None,
                },
            )
            .await
            .unwrap()
    }

    fn to_child(copy_id: Uuid, child_id: Uuid) -> CheckoutRequest {
        CheckoutRequest {
            copy_id: Some(copy_id),
            child_id: Some(child_id),
            ..Default::default()
        }
    }

    fn to_name(copy_id: Uuid, name: &str) -> CheckoutRequest {
        CheckoutRequest {
            copy_id: Some(copy_id),
            borrower_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn returning(loan_id: Uuid) -> ReturnRequest {
        ReturnRequest { loan_id: Some(loan_id) }
    }

    #[tokio::test]
    async fn test_checkout_return_round_trip() {
        let f = fixture().await;
        let child = seed_child(&f.store, &f.scope, "🐶🌈🎨").await;

        let loan = f.service.checkout(&f.scope, to_child(f.copy_id, child.id)).await.unwrap();
        assert!(loan.is_open());
        assert_eq!(loan.child_id, Some(child.id));
        assert_eq!(f.store.get_copy(&f.scope, f.copy_id).await.unwrap().status, CopyStatus::CheckedOut);

        let returned = f.service.return_loan(&f.scope, returning(loan.id)).await.unwrap();
        assert!(returned.returned_at.is_some());
        assert_eq!(f.store.get_copy(&f.scope, f.copy_id).await.unwrap().status, CopyStatus::Available);

        let loans = f.service.list_loans(&f.scope, LoanFilter::All).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert!(loans[0].loan.returned_at.is_some());
        assert_eq!(loans[0].child_emoji_id.as_deref(), Some("🐶🌈🎨"));
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_of_one_copy() {
        let f = fixture().await;
        let service = Arc::new(f.service.clone());

        let handles: Vec<_> = ["Ada", "Grace"]
            .into_iter()
            .map(|name| {
                let service = service.clone();
                let request = to_name(f.copy_id, name);
                let scope = f.scope;
                tokio::spawn(async move { service.checkout(&scope, request).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!((successes, conflicts), (1, 1));

        let open = f.service.list_loans(&f.scope, LoanFilter::Active).await.unwrap();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn test_double_return_conflicts() {
        let f = fixture().await;
        let loan = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap();
        f.service.return_loan(&f.scope, returning(loan.id)).await.unwrap();

        let err = f.service.return_loan(&f.scope, returning(loan.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Loan already returned"));
        assert_eq!(f.store.get_copy(&f.scope, f.copy_id).await.unwrap().status, CopyStatus::Available);
    }

    #[tokio::test]
    async fn test_checked_out_copy_becomes_available_after_return() {
        let f = fixture().await;
        let loan = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap();

        let err = f.service.checkout(&f.scope, to_name(f.copy_id, "Kim")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        f.service.return_loan(&f.scope, returning(loan.id)).await.unwrap();
        f.service.checkout(&f.scope, to_name(f.copy_id, "Kim")).await.unwrap();
    }

    #[tokio::test]
    async fn test_lost_and_damaged_copies_cannot_be_checked_out() {
        let f = fixture().await;
        for status in [CopyStatus::Lost, CopyStatus::Damaged] {
            f.store.set_copy_status(&f.scope, f.copy_id, status, Utc::now()).await.unwrap();
            let err = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)), "{status}");
        }
        assert!(f.service.list_loans(&f.scope, LoanFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_or_deleted_copy_is_not_found() {
        let f = fixture().await;
        let err = f.service.checkout(&f.scope, to_name(Uuid::new_v4(), "Sam")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        f.store.soft_delete_copy(&f.scope, f.copy_id, Utc::now()).await.unwrap();
        let err = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_other_organization_cannot_touch_circulation() {
        let f = fixture().await;
        let other = TenantScope::new(Uuid::new_v4());
        let loan = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap();

        let err = f.service.checkout(&other, to_name(f.copy_id, "Eve")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = f.service.return_loan(&other, returning(loan.id)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.service.list_loans(&other, LoanFilter::All).await.unwrap().is_empty());

        let foreign_child = seed_child(&f.store, &other, "🐯🎈🚀").await;
        f.service.return_loan(&f.scope, returning(loan.id)).await.unwrap();
        let err = f
            .service
            .checkout(&f.scope, to_child(f.copy_id, foreign_child.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m.starts_with("Child")));
    }

    #[tokio::test]
    async fn test_checkout_validation_lists_every_field() {
        let f = fixture().await;
        let request = CheckoutRequest {
            copy_id: None,
            borrower_name: Some("   ".to_string()),
            due_date: Some(Utc::now() - Duration::days(3)),
            ..Default::default()
        };

        let err = f.service.checkout(&f.scope, request).await.unwrap_err();
        let errors = match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected a validation error, got {other:?}"),
        };
        let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        for expected in ["copy_id", "child_id", "borrower_name", "due_date"] {
            assert!(fields.contains(&expected), "{expected} missing from {fields:?}");
        }
    }

    #[tokio::test]
    async fn test_due_date_today_is_accepted() {
        let f = fixture().await;
        let request = CheckoutRequest {
            due_date: Some(Utc::now() + Duration::minutes(1)),
            ..to_name(f.copy_id, "Sam")
        };
        f.service.checkout(&f.scope, request).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_checkout_leaves_no_partial_state() {
        let f = fixture().await;
        f.store.fail_at(FaultPoint::LoanInsert);

        let err = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(f.store.get_copy(&f.scope, f.copy_id).await.unwrap().status, CopyStatus::Available);
        assert!(f.service.list_loans(&f.scope, LoanFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_return_leaves_loan_open() {
        let f = fixture().await;
        let loan = f.service.checkout(&f.scope, to_name(f.copy_id, "Sam")).await.unwrap();
        f.store.fail_at(FaultPoint::CopyRelease);

        assert!(f.service.return_loan(&f.scope, returning(loan.id)).await.is_err());
        let active = f.service.list_loans(&f.scope, LoanFilter::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(f.store.get_copy(&f.scope, f.copy_id).await.unwrap().status, CopyStatus::CheckedOut);
    }

    #[tokio::test]
    async fn test_unknown_child_never_reaches_checkout() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_child()
            .returning(|_, id| Err(AppError::NotFound(format!("Child {} not found", id))));
        store.expect_checkout().never();

        let service = CirculationService::new(Arc::new(store));
        let scope = TenantScope::new(Uuid::new_v4());
        let err = service
            .checkout(&scope, to_child(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_outage_is_surfaced_not_swallowed() {
        let mut store = MockRecordStore::new();
        store
            .expect_checkout()
            .times(1)
            .returning(|_, _| Err(AppError::StoreUnavailable("connection reset".to_string())));

        let service = CirculationService::new(Arc::new(store));
        let scope = TenantScope::new(Uuid::new_v4());
        let err = service.checkout(&scope, to_name(Uuid::new_v4(), "Sam")).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
