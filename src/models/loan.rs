//! Book loan model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
    Lost,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
            LoanStatus::Lost => "lost",
        }
    }
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub status: String,
    pub loaned_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub renewals: i16,
    pub issued_by: Option<i32>,
}

impl Loan {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.returned_at.is_none() && self.due_date < now
    }
}

/// Loan with book and borrower context for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub status: String,
    pub loaned_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub renewals: i16,
    pub book_title: String,
    pub book_isbn: String,
    pub borrower_name: String,
    pub is_overdue: bool,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
    /// Borrower (defaults to the authenticated user)
    pub user_id: Option<i32>,
}

/// Loan query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    /// Filter by status (active, returned, lost)
    pub status: Option<String>,
    pub user_id: Option<i32>,
    pub book_id: Option<i32>,
    /// Only overdue loans
    pub overdue: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn loan(due_offset_hours: i64, returned: bool) -> Loan {
        let now = Utc::now();
        Loan {
            id: 1,
            book_id: 1,
            user_id: 1,
            status: if returned { "returned".into() } else { "active".into() },
            loaned_at: now - Duration::days(7),
            due_date: now + Duration::hours(due_offset_hours),
            returned_at: returned.then_some(now),
            renewals: 0,
            issued_by: None,
        }
    }

    #[test]
    fn overdue_only_when_active_and_past_due() {
        let now = Utc::now();
        assert!(loan(-1, false).is_overdue(now));
        assert!(!loan(1, false).is_overdue(now));
        assert!(!loan(-1, true).is_overdue(now));
    }
}
