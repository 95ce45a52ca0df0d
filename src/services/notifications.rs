//! Notification service: per-user records plus best-effort email

use crate::{
    error::AppResult,
    models::{
        notification::{
            BroadcastNotification, Notification, NotificationKind, NotificationQuery,
        },
        reservation::Reservation,
    },
    repository::Repository,
    services::email::EmailService,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
    email: EmailService,
}

impl NotificationsService {
    pub fn new(repository: Repository, email: EmailService) -> Self {
        Self { repository, email }
    }

    /// List a user's notifications
    pub async fn for_user(
        &self,
        user_id: i32,
        query: &NotificationQuery,
    ) -> AppResult<(Vec<Notification>, i64)> {
        self.repository.notifications.for_user(user_id, query).await
    }

    pub async fn unread_count(&self, user_id: i32) -> AppResult<i64> {
        self.repository.notifications.unread_count(user_id).await
    }

    pub async fn mark_read(&self, id: i32, user_id: i32) -> AppResult<Notification> {
        self.repository.notifications.mark_read(id, user_id).await
    }

    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<i64> {
        self.repository.notifications.mark_all_read(user_id).await
    }

    /// Staff broadcast to a role (or everyone)
    pub async fn broadcast(&self, data: &BroadcastNotification) -> AppResult<i64> {
        let user_ids = self.repository.users.ids_by_role(data.role).await?;
        let count = self
            .repository
            .notifications
            .notify_many(&user_ids, NotificationKind::Announcement, &data.title, data.body.as_deref())
            .await?;
        tracing::info!(recipients = count, "Announcement broadcast");
        Ok(count)
    }

    /// Create a plain notification for one user
    pub async fn notify(
        &self,
        user_id: i32,
        kind: NotificationKind,
        title: &str,
        body: Option<&str>,
    ) -> AppResult<Notification> {
        self.repository.notifications.notify(user_id, kind, title, body).await
    }

    /// Reservation promoted to ready: record + best-effort email.
    /// Email failures are logged, never surfaced to the caller.
    pub async fn reservation_ready(&self, reservation: &Reservation, hold_days: i64) {
        let title = "Your reserved book is ready for pickup";

        let book = self.repository.books.get_by_id(reservation.book_id).await;
        let user = self.repository.users.get_by_id(reservation.user_id).await;

        let body = book
            .as_ref()
            .map(|b| format!("\"{}\" is waiting for you at the library desk.", b.title))
            .ok();

        if let Err(e) = self
            .repository
            .notifications
            .notify(reservation.user_id, NotificationKind::ReservationReady, title, body.as_deref())
            .await
        {
            tracing::warn!("Failed to record reservation-ready notification: {}", e);
        }

        if let (Ok(book), Ok(user)) = (book, user) {
            if let Err(e) = self
                .email
                .send_reservation_ready(&user.email, &book.title, hold_days)
                .await
            {
                tracing::warn!(user_id = user.id, "Failed to send reservation email: {}", e);
            }
        }
    }

    /// Hold expired without pickup
    pub async fn reservation_expired(&self, reservation: &Reservation) {
        let body = self
            .repository
            .books
            .get_by_id(reservation.book_id)
            .await
            .map(|b| format!("Your hold on \"{}\" expired and the copy was passed on.", b.title))
            .ok();

        if let Err(e) = self
            .repository
            .notifications
            .notify(
                reservation.user_id,
                NotificationKind::ReservationExpired,
                "Your reservation expired",
                body.as_deref(),
            )
            .await
        {
            tracing::warn!("Failed to record reservation-expired notification: {}", e);
        }
    }
}
