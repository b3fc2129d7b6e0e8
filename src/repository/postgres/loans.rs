//! Loans: checkout and return run as single transactions

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::conflict_on_unique;
use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanFilter, NewLoan},
    tenant::TenantScope,
};

pub(super) async fn list(pool: &Pool<Postgres>, scope: &TenantScope, filter: LoanFilter) -> AppResult<Vec<LoanDetails>> {
    let condition = match filter {
        LoanFilter::All => "",
        LoanFilter::Active => "AND l.returned_at IS NULL",
        LoanFilter::Returned => "AND l.returned_at IS NOT NULL",
    };
    let query = format!(
        r#"
        SELECT l.*,
               c.book_id, b.title AS book_title, c.barcode AS copy_barcode,
               ch.emoji_id AS child_emoji_id, ch.name AS child_name
        FROM loans l
        JOIN copies c ON c.id = l.copy_id
        JOIN books b ON b.id = c.book_id
        LEFT JOIN children ch ON ch.id = l.child_id
        WHERE l.org_id = $1 {}
        ORDER BY l.checked_out_at DESC
        "#,
        condition
    );

    let loans = sqlx::query_as::<_, LoanDetails>(&query)
        .bind(scope.org_id())
        .fetch_all(pool)
        .await?;

    Ok(loans)
}

pub(super) async fn get(pool: &Pool<Postgres>, scope: &TenantScope, id: Uuid) -> AppResult<Loan> {
    sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 AND org_id = $2")
        .bind(id)
        .bind(scope.org_id())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
}

pub(super) async fn checkout(pool: &Pool<Postgres>, scope: &TenantScope, loan: &NewLoan) -> AppResult<Loan> {
    let mut tx = pool.begin().await?;

    // Holds the child row until commit so a concurrent soft delete waits for us.
    if let Some(child_id) = loan.child_id {
        let live: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM children WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL FOR SHARE",
        )
        .bind(child_id)
        .bind(scope.org_id())
        .fetch_optional(&mut *tx)
        .await?;

        if live.is_none() {
            return Err(AppError::NotFound(format!("Child {} not found", child_id)));
        }
    }

    // Only one concurrent checkout can move the copy out of `available`.
    let flipped = sqlx::query(
        r#"
        UPDATE copies SET status = 'checked_out', updated_at = $3
        WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL AND status = 'available'
        "#,
    )
    .bind(loan.copy_id)
    .bind(scope.org_id())
    .bind(loan.checked_out_at)
    .execute(&mut *tx)
    .await?;

    if flipped.rows_affected() == 0 {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM copies WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL)",
        )
        .bind(loan.copy_id)
        .bind(scope.org_id())
        .fetch_one(&mut *tx)
        .await?;

        return Err(if exists {
            AppError::Conflict("Copy is not available".to_string())
        } else {
            AppError::NotFound("Copy not found".to_string())
        });
    }

    let record = sqlx::query_as::<_, Loan>(
        r#"
        INSERT INTO loans (
            id, org_id, copy_id, child_id, borrower_name, borrower_class,
            checked_out_at, due_date, notes, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.org_id())
    .bind(loan.copy_id)
    .bind(loan.child_id)
    .bind(&loan.borrower_name)
    .bind(&loan.borrower_class)
    .bind(loan.checked_out_at)
    .bind(loan.due_date)
    .bind(&loan.notes)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, "Copy already has an open loan"))?;

    tx.commit().await?;
    Ok(record)
}

pub(super) async fn return_loan(
    pool: &Pool<Postgres>,
    scope: &TenantScope,
    loan_id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<Loan> {
    let mut tx = pool.begin().await?;

    let closed = sqlx::query_as::<_, Loan>(
        r#"
        UPDATE loans SET returned_at = $3
        WHERE id = $1 AND org_id = $2 AND returned_at IS NULL
        RETURNING *
        "#,
    )
    .bind(loan_id)
    .bind(scope.org_id())
    .bind(at)
    .fetch_optional(&mut *tx)
    .await?;

    let loan = match closed {
        Some(loan) => loan,
        None => {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE id = $1 AND org_id = $2)")
                    .bind(loan_id)
                    .bind(scope.org_id())
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if exists {
                AppError::Conflict("Loan already returned".to_string())
            } else {
                AppError::NotFound("Loan not found".to_string())
            });
        }
    };

    sqlx::query("UPDATE copies SET status = 'available', updated_at = $3 WHERE id = $1 AND org_id = $2")
        .bind(loan.copy_id)
        .bind(scope.org_id())
        .bind(at)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(loan)
}
