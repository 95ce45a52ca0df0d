//! Loan circulation service

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, Loan, LoanDetails, LoanQuery},
        user::UserClaims,
    },
    repository::Repository,
    services::notifications::NotificationsService,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    notifications: NotificationsService,
}

impl LoansService {
    pub fn new(repository: Repository, notifications: NotificationsService) -> Self {
        Self { repository, notifications }
    }

    /// Borrow a book. Blocked borrowers are refused; availability and the
    /// per-user cap are re-checked inside the repository transaction.
    pub async fn create(&self, data: CreateLoan, claims: &UserClaims) -> AppResult<Loan> {
        let borrower_id = data.user_id.unwrap_or(claims.user_id);
        if borrower_id != claims.user_id && !claims.is_librarian() {
            return Err(AppError::Authorization(
                "Only library staff can issue loans to other users".to_string(),
            ));
        }

        let borrower = self.repository.users.get_by_id(borrower_id).await?;
        if borrower.is_blocked() {
            return Err(AppError::BusinessRule("Borrower account is blocked".to_string()));
        }

        let rules = self.repository.settings.circulation().await?;
        let loan = self
            .repository
            .loans
            .create(
                data.book_id,
                borrower_id,
                claims.user_id,
                rules.loan_period_days,
                rules.max_loans_per_user,
            )
            .await?;

        tracing::info!(loan_id = loan.id, book_id = loan.book_id, user_id = loan.user_id, "Loan created");
        Ok(loan)
    }

    /// Return a loan. A promoted reservation holder is notified.
    pub async fn return_loan(&self, id: i32) -> AppResult<LoanDetails> {
        let rules = self.repository.settings.circulation().await?;
        let (loan, promoted) = self
            .repository
            .loans
            .return_loan(id, rules.reservation_hold_days)
            .await?;

        if let Some(reservation) = promoted {
            self.notifications
                .reservation_ready(&reservation, rules.reservation_hold_days)
                .await;
        }

        self.repository.loans.get_details(loan.id).await
    }

    /// Renew a loan
    pub async fn renew(&self, id: i32, claims: &UserClaims) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(id).await?;
        if loan.user_id != claims.user_id && !claims.is_librarian() {
            return Err(AppError::Authorization("Only the borrower or library staff can renew".to_string()));
        }

        let rules = self.repository.settings.circulation().await?;
        self.repository
            .loans
            .renew(id, rules.loan_period_days, rules.max_renewals)
            .await
    }

    /// Search loans with pagination
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.loans.search(query).await
    }

    /// Borrowing history for a user
    pub async fn for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.for_user(user_id).await
    }
}
