//! Reservation (hold queue) service

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::Loan,
        reservation::{CreateReservation, Reservation, ReservationDetails, ReservationQuery},
        user::UserClaims,
    },
    repository::Repository,
    services::notifications::NotificationsService,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    notifications: NotificationsService,
}

impl ReservationsService {
    pub fn new(repository: Repository, notifications: NotificationsService) -> Self {
        Self { repository, notifications }
    }

    /// Place a hold on a book
    pub async fn create(&self, data: CreateReservation, claims: &UserClaims) -> AppResult<Reservation> {
        let holder_id = data.user_id.unwrap_or(claims.user_id);
        if holder_id != claims.user_id && !claims.is_librarian() {
            return Err(AppError::Authorization(
                "Only library staff can reserve on behalf of other users".to_string(),
            ));
        }

        let holder = self.repository.users.get_by_id(holder_id).await?;
        if holder.is_blocked() {
            return Err(AppError::BusinessRule("Holder account is blocked".to_string()));
        }

        let reservation = self.repository.reservations.create(data.book_id, holder_id).await?;
        tracing::info!(
            reservation_id = reservation.id,
            book_id = reservation.book_id,
            position = reservation.position,
            "Reservation placed"
        );
        Ok(reservation)
    }

    /// Cancel a hold (holder or library staff)
    pub async fn cancel(&self, id: i32, claims: &UserClaims) -> AppResult<Reservation> {
        let reservation = self.repository.reservations.get_by_id(id).await?;
        if reservation.user_id != claims.user_id && !claims.is_librarian() {
            return Err(AppError::Authorization(
                "Only the holder or library staff can cancel a reservation".to_string(),
            ));
        }

        let rules = self.repository.settings.circulation().await?;
        self.repository.reservations.cancel(id, rules.reservation_hold_days).await
    }

    /// Convert a ready hold into a loan (pickup at the desk)
    pub async fn fulfill(&self, id: i32) -> AppResult<(Reservation, Loan)> {
        let rules = self.repository.settings.circulation().await?;
        let (reservation, loan_id) = self
            .repository
            .reservations
            .fulfill(id, rules.loan_period_days)
            .await?;
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        tracing::info!(reservation_id = reservation.id, loan_id = loan.id, "Reservation fulfilled");
        Ok((reservation, loan))
    }

    /// Sweep expired holds, promoting the next reader in each queue.
    /// Returns the number of holds expired.
    pub async fn process_expired(&self) -> AppResult<i64> {
        let rules = self.repository.settings.circulation().await?;
        let expired = self
            .repository
            .reservations
            .process_expired(rules.reservation_hold_days)
            .await?;

        for reservation in &expired {
            self.notifications.reservation_expired(reservation).await;
        }

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Expired reservations processed");
        }
        Ok(expired.len() as i64)
    }

    /// Open queue for a book
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<ReservationDetails>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.reservations.for_book(book_id).await
    }

    /// A user's reservations
    pub async fn for_user(
        &self,
        user_id: i32,
        query: &ReservationQuery,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.reservations.for_user(user_id, query).await
    }
}
