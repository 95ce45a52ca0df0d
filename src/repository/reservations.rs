//! Reservations repository: the book hold queue

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationDetails, ReservationQuery, ReservationStatus},
};

use super::page_bounds;

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.book_id, r.user_id, r.status, r.position, r.reserved_at,
           r.ready_at, r.expires_at, b.title AS book_title,
           u.first_name || ' ' || u.last_name AS holder_name
    FROM book_reservations r
    JOIN books b ON r.book_id = b.id
    JOIN users u ON r.user_id = u.id
"#;

/// Promote the oldest pending reservation for a book, or release the copy.
///
/// Called with the book row already locked. When a pending reservation exists
/// it becomes `ready` (position 0, hold expiry set) and the copy stays held;
/// otherwise `available_copies` is incremented. Returns the promoted
/// reservation, if any.
pub(crate) async fn promote_or_release(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i32,
    hold_days: i64,
) -> AppResult<Option<Reservation>> {
    let next = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT * FROM book_reservations
        WHERE book_id = $1 AND status = 'pending'
        ORDER BY position
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(book_id)
    .fetch_optional(&mut **tx)
    .await?;

    match next {
        Some(reservation) => {
            let now = Utc::now();
            let expires_at = now + Duration::days(hold_days);
            let promoted = sqlx::query_as::<_, Reservation>(
                r#"
                UPDATE book_reservations
                SET status = 'ready', position = 0, ready_at = $1, expires_at = $2
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(now)
            .bind(expires_at)
            .bind(reservation.id)
            .fetch_one(&mut **tx)
            .await?;

            // Compact the remaining queue
            sqlx::query(
                "UPDATE book_reservations SET position = position - 1 WHERE book_id = $1 AND status = 'pending'",
            )
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

            Ok(Some(promoted))
        }
        None => {
            sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
                .bind(book_id)
                .execute(&mut **tx)
                .await?;
            Ok(None)
        }
    }
}

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM book_reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Place a hold on a book.
    /// Queue position is the number of pending reservations + 1.
    pub async fn create(&self, book_id: i32, user_id: i32) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if available > 0 {
            return Err(AppError::BusinessRule(
                "Copies are available; borrow the book instead of reserving it".to_string(),
            ));
        }

        let already_open: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM book_reservations
                WHERE book_id = $1 AND user_id = $2 AND status IN ('pending', 'ready')
            )
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_open {
            return Err(AppError::Conflict("An open reservation for this book already exists".to_string()));
        }

        let has_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_loans WHERE book_id = $1 AND user_id = $2 AND status = 'active')",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if has_loan {
            return Err(AppError::Conflict("This book is already on loan to the user".to_string()));
        }

        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_reservations WHERE book_id = $1 AND status = 'pending'",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO book_reservations (book_id, user_id, status, position)
            VALUES ($1, $2, 'pending', $3)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(pending as i32 + 1)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reservation)
    }

    /// Cancel an open reservation. Pending holds behind it shift down; a
    /// cancelled `ready` hold passes its copy to the next in line (or back to
    /// the shelf).
    pub async fn cancel(&self, id: i32, hold_days: i64) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM book_reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        let status: ReservationStatus = reservation
            .status
            .parse()
            .map_err(|e: String| AppError::Internal(e))?;
        if !status.is_open() {
            return Err(AppError::BusinessRule(format!(
                "A {} reservation cannot be cancelled",
                reservation.status
            )));
        }

        // Lock the book row before touching the queue or the counter
        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(reservation.book_id)
            .execute(&mut *tx)
            .await?;

        let cancelled = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE book_reservations
            SET status = 'cancelled', closed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        match status {
            ReservationStatus::Pending => {
                sqlx::query(
                    r#"
                    UPDATE book_reservations SET position = position - 1
                    WHERE book_id = $1 AND status = 'pending' AND position > $2
                    "#,
                )
                .bind(reservation.book_id)
                .bind(reservation.position)
                .execute(&mut *tx)
                .await?;
            }
            ReservationStatus::Ready => {
                promote_or_release(&mut tx, reservation.book_id, hold_days).await?;
            }
            _ => unreachable!(),
        }

        tx.commit().await?;
        Ok(cancelled)
    }

    /// Convert a ready reservation into a loan. The held copy backs the loan,
    /// so the availability counter is untouched.
    pub async fn fulfill(&self, id: i32, loan_days: i64) -> AppResult<(Reservation, i32)> {
        let mut tx = self.pool.begin().await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM book_reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        if reservation.status != "ready" {
            return Err(AppError::BusinessRule(format!(
                "Only a ready reservation can be fulfilled (status is {})",
                reservation.status
            )));
        }

        let now = Utc::now();
        let due_date = now + Duration::days(loan_days);

        let loan_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO book_loans (book_id, user_id, status, loaned_at, due_date)
            VALUES ($1, $2, 'active', $3, $4)
            RETURNING id
            "#,
        )
        .bind(reservation.book_id)
        .bind(reservation.user_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        let fulfilled = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE book_reservations
            SET status = 'fulfilled', closed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((fulfilled, loan_id))
    }

    /// Expire every ready hold past its deadline, promoting the next pending
    /// reservation for each (or releasing the copy). Returns the expired
    /// reservations so holders can be notified.
    pub async fn process_expired(&self, hold_days: i64) -> AppResult<Vec<Reservation>> {
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM book_reservations
            WHERE status = 'ready' AND expires_at < NOW()
            ORDER BY book_id
            FOR UPDATE
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        for reservation in &expired {
            sqlx::query(
                "UPDATE book_reservations SET status = 'expired', closed_at = NOW() WHERE id = $1",
            )
            .bind(reservation.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                .bind(reservation.book_id)
                .execute(&mut *tx)
                .await?;

            promote_or_release(&mut tx, reservation.book_id, hold_days).await?;
        }

        tx.commit().await?;
        Ok(expired)
    }

    /// Open reservations for a book, queue order
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query_as::<_, ReservationDetails>(&format!(
            "{} WHERE r.book_id = $1 AND r.status IN ('pending', 'ready') ORDER BY r.position",
            DETAILS_SELECT
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Reservations held by a user, with pagination
    pub async fn for_user(
        &self,
        user_id: i32,
        query: &ReservationQuery,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = vec!["r.user_id = $1".to_string()];
        let status_param = query.status.clone();
        if status_param.is_some() {
            conditions.push("r.status = $2".to_string());
        }
        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_sql = format!(
            "SELECT COUNT(*) FROM book_reservations r {}",
            where_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(ref s) = status_param {
            count_query = count_query.bind(s);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let base = if status_param.is_some() { 2 } else { 1 };
        let list_sql = format!(
            "{} {} ORDER BY r.reserved_at DESC LIMIT ${} OFFSET ${}",
            DETAILS_SELECT,
            where_clause,
            base + 1,
            base + 2
        );
        let mut list_query = sqlx::query_as::<_, ReservationDetails>(&list_sql).bind(user_id);
        if let Some(ref s) = status_param {
            list_query = list_query.bind(s);
        }
        let rows = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    /// Count of open reservations
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_reservations WHERE status IN ('pending', 'ready')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
