//! Messaging service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        message::{
            Conversation, ConversationSummary, CreateConversation, Message, MessageQuery,
            SendMessage,
        },
        notification::NotificationKind,
        user::UserClaims,
    },
    repository::Repository,
    services::notifications::NotificationsService,
};

#[derive(Clone)]
pub struct MessagesService {
    repository: Repository,
    notifications: NotificationsService,
}

impl MessagesService {
    pub fn new(repository: Repository, notifications: NotificationsService) -> Self {
        Self { repository, notifications }
    }

    /// Start a conversation; recipients get a notification
    pub async fn create_conversation(
        &self,
        data: CreateConversation,
        claims: &UserClaims,
    ) -> AppResult<Conversation> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let conversation = self
            .repository
            .messages
            .create_conversation(
                claims.user_id,
                &data.participant_ids,
                data.subject.as_deref(),
                &data.body,
            )
            .await?;

        self.notify_participants(conversation.id, claims.user_id).await;
        Ok(conversation)
    }

    /// Inbox for the authenticated user
    pub async fn conversations(&self, claims: &UserClaims) -> AppResult<Vec<ConversationSummary>> {
        self.repository.messages.conversations_for_user(claims.user_id).await
    }

    /// Messages in a conversation (participants only)
    pub async fn messages(
        &self,
        conversation_id: i32,
        query: &MessageQuery,
        claims: &UserClaims,
    ) -> AppResult<(Vec<Message>, i64)> {
        self.require_participant(conversation_id, claims).await?;
        self.repository.messages.messages(conversation_id, query).await
    }

    /// Send a message (participants only); other participants are notified
    pub async fn send(
        &self,
        conversation_id: i32,
        data: SendMessage,
        claims: &UserClaims,
    ) -> AppResult<Message> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.require_participant(conversation_id, claims).await?;

        let message = self
            .repository
            .messages
            .send(conversation_id, claims.user_id, &data.body)
            .await?;

        // Sending implies having read the thread up to now
        self.repository
            .messages
            .mark_read(conversation_id, claims.user_id)
            .await?;

        self.notify_participants(conversation_id, claims.user_id).await;
        Ok(message)
    }

    /// Mark a conversation read
    pub async fn mark_read(&self, conversation_id: i32, claims: &UserClaims) -> AppResult<()> {
        self.require_participant(conversation_id, claims).await?;
        self.repository.messages.mark_read(conversation_id, claims.user_id).await
    }

    async fn require_participant(&self, conversation_id: i32, claims: &UserClaims) -> AppResult<()> {
        if !self
            .repository
            .messages
            .is_participant(conversation_id, claims.user_id)
            .await?
        {
            return Err(AppError::Authorization(
                "Not a participant in this conversation".to_string(),
            ));
        }
        Ok(())
    }

    /// Best-effort new-message notifications for the other participants
    async fn notify_participants(&self, conversation_id: i32, sender_id: i32) {
        let ids = match self.repository.messages.participant_ids(conversation_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Failed to load participants for notification: {}", e);
                return;
            }
        };

        for user_id in ids.into_iter().filter(|id| *id != sender_id) {
            if let Err(e) = self
                .notifications
                .notify(user_id, NotificationKind::NewMessage, "New message", None)
                .await
            {
                tracing::warn!(user_id, "Failed to record message notification: {}", e);
            }
        }
    }
}
