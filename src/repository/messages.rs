//! Messages repository: conversations, participants, messages

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::message::{Conversation, ConversationSummary, Message, MessageQuery},
};

use super::page_bounds;

#[derive(Clone)]
pub struct MessagesRepository {
    pool: Pool<Postgres>,
}

impl MessagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Start a conversation with its participants and initial message,
    /// all inside one transaction.
    pub async fn create_conversation(
        &self,
        creator_id: i32,
        participant_ids: &[i32],
        subject: Option<&str>,
        body: &str,
    ) -> AppResult<Conversation> {
        let mut tx = self.pool.begin().await?;

        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (subject) VALUES ($1) RETURNING *",
        )
        .bind(subject)
        .fetch_one(&mut *tx)
        .await?;

        let mut members: Vec<i32> = participant_ids.to_vec();
        members.push(creator_id);
        members.sort_unstable();
        members.dedup();

        for user_id in &members {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
            if !exists {
                return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
            }
            sqlx::query(
                "INSERT INTO conversation_participants (conversation_id, user_id) VALUES ($1, $2)",
            )
            .bind(conversation.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, body) VALUES ($1, $2, $3)",
        )
        .bind(conversation.id)
        .bind(creator_id)
        .bind(body)
        .execute(&mut *tx)
        .await?;

        // The sender has read their own message
        sqlx::query(
            "UPDATE conversation_participants SET last_read_at = NOW() WHERE conversation_id = $1 AND user_id = $2",
        )
        .bind(conversation.id)
        .bind(creator_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(conversation)
    }

    /// Whether a user participates in a conversation
    pub async fn is_participant(&self, conversation_id: i32, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM conversation_participants WHERE conversation_id = $1 AND user_id = $2)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Participant user ids of a conversation
    pub async fn participant_ids(&self, conversation_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT user_id FROM conversation_participants WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Inbox view: a user's conversations with last message and unread count
    pub async fn conversations_for_user(&self, user_id: i32) -> AppResult<Vec<ConversationSummary>> {
        let rows = sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT c.id, c.subject, c.created_at,
                   (SELECT m.body FROM messages m
                     WHERE m.conversation_id = c.id
                     ORDER BY m.sent_at DESC LIMIT 1) AS last_message,
                   (SELECT m.sent_at FROM messages m
                     WHERE m.conversation_id = c.id
                     ORDER BY m.sent_at DESC LIMIT 1) AS last_message_at,
                   (SELECT COUNT(*) FROM messages m
                     WHERE m.conversation_id = c.id
                       AND m.sender_id != $1
                       AND (cp.last_read_at IS NULL OR m.sent_at > cp.last_read_at)) AS unread_count
            FROM conversations c
            JOIN conversation_participants cp
              ON cp.conversation_id = c.id AND cp.user_id = $1
            ORDER BY last_message_at DESC NULLS LAST
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Messages in a conversation, oldest first, with pagination
    pub async fn messages(
        &self,
        conversation_id: i32,
        query: &MessageQuery,
    ) -> AppResult<(Vec<Message>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.body, m.sent_at,
                   u.first_name || ' ' || u.last_name AS sender_name
            FROM messages m
            JOIN users u ON m.sender_id = u.id
            WHERE m.conversation_id = $1
            ORDER BY m.sent_at
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Append a message
    pub async fn send(&self, conversation_id: i32, sender_id: i32, body: &str) -> AppResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            WITH inserted AS (
                INSERT INTO messages (conversation_id, sender_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.conversation_id, i.sender_id, i.body, i.sent_at,
                   u.first_name || ' ' || u.last_name AS sender_name
            FROM inserted i
            JOIN users u ON i.sender_id = u.id
            "#,
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    /// Mark a conversation read for a user
    pub async fn mark_read(&self, conversation_id: i32, user_id: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE conversation_participants SET last_read_at = NOW() WHERE conversation_id = $1 AND user_id = $2",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
