//! Book reservation (hold queue) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Reservation status
///
/// pending → ready → fulfilled, with cancelled/expired terminal branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Ready,
    Fulfilled,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Ready => "ready",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Expired => "expired",
        }
    }

    /// Still holding a place in the queue
    pub fn is_open(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Ready)
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "ready" => Ok(ReservationStatus::Ready),
            "fulfilled" => Ok(ReservationStatus::Fulfilled),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "expired" => Ok(ReservationStatus::Expired),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

/// Reservation model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub status: String,
    /// Position in the hold queue (1 = next in line)
    pub position: i32,
    pub reserved_at: DateTime<Utc>,
    pub ready_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Reservation with book and holder context
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub status: String,
    pub position: i32,
    pub reserved_at: DateTime<Utc>,
    pub ready_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub book_title: String,
    pub holder_name: String,
}

/// Create reservation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub book_id: i32,
    /// Holder (defaults to the authenticated user)
    pub user_id: Option<i32>,
}

/// Reservation query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReservationQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_states() {
        assert!(ReservationStatus::Pending.is_open());
        assert!(ReservationStatus::Ready.is_open());
        assert!(!ReservationStatus::Fulfilled.is_open());
        assert!(!ReservationStatus::Cancelled.is_open());
        assert!(!ReservationStatus::Expired.is_open());
    }

    #[test]
    fn status_round_trips() {
        for s in ["pending", "ready", "fulfilled", "cancelled", "expired"] {
            assert_eq!(s.parse::<ReservationStatus>().unwrap().as_str(), s);
        }
        assert!("held".parse::<ReservationStatus>().is_err());
    }
}
