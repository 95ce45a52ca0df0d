//! Notification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::user::Role;

/// Notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReservationReady,
    ReservationExpired,
    LoanOverdue,
    BadgeAwarded,
    NewMessage,
    Announcement,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ReservationReady => "reservation_ready",
            NotificationKind::ReservationExpired => "reservation_expired",
            NotificationKind::LoanOverdue => "loan_overdue",
            NotificationKind::BadgeAwarded => "badge_awarded",
            NotificationKind::NewMessage => "new_message",
            NotificationKind::Announcement => "announcement",
        }
    }
}

/// Notification from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Staff broadcast request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BroadcastNotification {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    pub body: Option<String>,
    /// Restrict the broadcast to one role (everyone when omitted)
    pub role: Option<Role>,
}

/// Notification list query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    /// Only unread notifications
    pub unread: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Unread counter payload
#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub unread: i64,
}
