//! Messaging models: conversations, participants, messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Conversation from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Conversation {
    pub id: i32,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Conversation with last message and unread count for inbox views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ConversationSummary {
    pub id: i32,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

/// Message from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: i32,
    pub conversation_id: i32,
    pub sender_id: i32,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub sender_name: String,
}

/// Start a conversation with an initial message
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateConversation {
    pub subject: Option<String>,
    /// Other participants (the sender is added automatically)
    #[validate(length(min = 1, message = "At least one recipient is required"))]
    pub participant_ids: Vec<i32>,
    #[validate(length(min = 1, message = "Message body is required"))]
    pub body: String,
}

/// Send a message in an existing conversation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessage {
    #[validate(length(min = 1, message = "Message body is required"))]
    pub body: String,
}

/// Message list query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MessageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
