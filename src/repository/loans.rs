//! Loans repository for database operations

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanDetails, LoanQuery},
        reservation::Reservation,
    },
};

use super::{page_bounds, reservations::promote_or_release};

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_id, l.user_id, l.status, l.loaned_at, l.due_date,
           l.returned_at, l.renewals, b.title AS book_title, b.isbn AS book_isbn,
           u.first_name || ' ' || u.last_name AS borrower_name,
           (l.status = 'active' AND l.due_date < NOW()) AS is_overdue
    FROM book_loans l
    JOIN books b ON l.book_id = b.id
    JOIN users u ON l.user_id = u.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM book_loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan with book/borrower context
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Borrow a book. Inside one transaction: re-check availability under a
    /// row lock, enforce the per-user loan cap, insert the loan and decrement
    /// the availability counter.
    pub async fn create(
        &self,
        book_id: i32,
        user_id: i32,
        issued_by: i32,
        loan_days: i64,
        max_loans: i64,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if available <= 0 {
            return Err(AppError::BusinessRule(
                "No copies available; place a reservation instead".to_string(),
            ));
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_loans WHERE book_id = $1 AND user_id = $2 AND status = 'active')",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::Conflict("This book is already on loan to the user".to_string()));
        }

        let current_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if current_loans >= max_loans {
            return Err(AppError::BusinessRule(format!(
                "Maximum loans reached ({}/{})",
                current_loans, max_loans
            )));
        }

        let now = Utc::now();
        let due_date = now + Duration::days(loan_days);

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO book_loans (book_id, user_id, status, loaned_at, due_date, issued_by)
            VALUES ($1, $2, 'active', $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .bind(due_date)
        .bind(issued_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Return a loan. The freed copy goes to the oldest pending reservation
    /// when one exists; otherwise back to the shelf. Returns the closed loan
    /// and the promoted reservation, if any.
    pub async fn return_loan(&self, id: i32, hold_days: i64) -> AppResult<(Loan, Option<Reservation>)> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM book_loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.returned_at.is_some() {
            return Err(AppError::BusinessRule("Loan already returned".to_string()));
        }

        let returned = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE book_loans
            SET status = 'returned', returned_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        let promoted = promote_or_release(&mut tx, loan.book_id, hold_days).await?;

        tx.commit().await?;
        Ok((returned, promoted))
    }

    /// Renew a loan, pushing the due date out by the loan period
    pub async fn renew(&self, id: i32, loan_days: i64, max_renewals: i64) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM book_loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.returned_at.is_some() {
            return Err(AppError::BusinessRule("Cannot renew a returned loan".to_string()));
        }

        if i64::from(loan.renewals) >= max_renewals {
            return Err(AppError::BusinessRule(format!(
                "Maximum renewals reached ({}/{})",
                loan.renewals, max_renewals
            )));
        }

        let pending_hold: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_reservations WHERE book_id = $1 AND status = 'pending')",
        )
        .bind(loan.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if pending_hold {
            return Err(AppError::Conflict(
                "Another reader holds a reservation for this book".to_string(),
            ));
        }

        let new_due = Utc::now() + Duration::days(loan_days);

        let renewed = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE book_loans
            SET due_date = $1, renewals = renewals + 1
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(new_due)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(renewed)
    }

    /// Search loans with pagination
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let status_param = query.status.clone();
        if status_param.is_some() {
            conditions.push("l.status = $1".to_string());
        }
        if let Some(id) = query.user_id {
            conditions.push(format!("l.user_id = {}", id));
        }
        if let Some(id) = query.book_id {
            conditions.push(format!("l.book_id = {}", id));
        }
        if query.overdue == Some(true) {
            conditions.push("l.status = 'active' AND l.due_date < NOW()".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM book_loans l {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref s) = status_param {
            count_query = count_query.bind(s);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let base = if status_param.is_some() { 1 } else { 0 };
        let list_sql = format!(
            "{} {} ORDER BY l.loaned_at DESC LIMIT ${} OFFSET ${}",
            DETAILS_SELECT,
            where_clause,
            base + 1,
            base + 2
        );
        let mut list_query = sqlx::query_as::<_, LoanDetails>(&list_sql);
        if let Some(ref s) = status_param {
            list_query = list_query.bind(s);
        }
        let loans = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((loans, total))
    }

    /// Full borrowing history for a user
    pub async fn for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.user_id = $1 ORDER BY l.loaned_at DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_loans WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue loans
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE status = 'active' AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
