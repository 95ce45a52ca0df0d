//! Notifications repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::notification::{Notification, NotificationKind, NotificationQuery},
};

use super::page_bounds;

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a notification for one user
    pub async fn notify(
        &self,
        user_id: i32,
        kind: NotificationKind,
        title: &str,
        body: Option<&str>,
    ) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    /// Fan a notification out to many users in one transaction
    pub async fn notify_many(
        &self,
        user_ids: &[i32],
        kind: NotificationKind,
        title: &str,
        body: Option<&str>,
    ) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;
        for user_id in user_ids {
            sqlx::query(
                "INSERT INTO notifications (user_id, kind, title, body) VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(kind.as_str())
            .bind(title)
            .bind(body)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(user_ids.len() as i64)
    }

    /// List a user's notifications with pagination
    pub async fn for_user(
        &self,
        user_id: i32,
        query: &NotificationQuery,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let unread_clause = if query.unread == Some(true) {
            " AND read_at IS NULL"
        } else {
            ""
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1{}",
            unread_clause
        );
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "SELECT * FROM notifications WHERE user_id = $1{} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            unread_clause
        );
        let rows = sqlx::query_as::<_, Notification>(&list_sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Count unread notifications for a user
    pub async fn unread_count(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one notification read (owner only)
    pub async fn mark_read(&self, id: i32, user_id: i32) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification with id {} not found", id)))
    }

    /// Mark all of a user's notifications read
    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<i64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() as i64)
    }
}
