//! Messaging endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::message::{
        Conversation, ConversationSummary, CreateConversation, Message, MessageQuery, SendMessage,
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// Start a conversation with an initial message
#[utoipa::path(
    post,
    path = "/conversations",
    tag = "messages",
    security(("bearer_auth" = [])),
    request_body = CreateConversation,
    responses(
        (status = 201, description = "Conversation created", body = ApiResponse<Conversation>),
        (status = 400, description = "No recipients or empty body"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn create_conversation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateConversation>,
) -> AppResult<(StatusCode, Json<ApiResponse<Conversation>>)> {
    let conversation = state
        .services
        .messages
        .create_conversation(request, &claims)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Conversation created", conversation)))
}

/// Inbox: own conversations with last message and unread count
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Conversations", body = ApiResponse<Vec<ConversationSummary>>)
    )
)]
pub async fn list_conversations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<ConversationSummary>>>> {
    let conversations = state.services.messages.conversations(&claims).await?;
    Ok(ApiResponse::new("Conversations", conversations))
}

/// Messages in a conversation (participants only)
#[utoipa::path(
    get,
    path = "/conversations/{id}/messages",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Conversation ID"),
        MessageQuery
    ),
    responses(
        (status = 200, description = "Messages", body = ApiResponse<Vec<Message>>),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn list_messages(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    let (messages, total) = state.services.messages.messages(id, &query, &claims).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Messages", messages, pagination))
}

/// Send a message in a conversation
#[utoipa::path(
    post,
    path = "/conversations/{id}/messages",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Conversation ID")
    ),
    request_body = SendMessage,
    responses(
        (status = 201, description = "Message sent", body = ApiResponse<Message>),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn send_message(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<SendMessage>,
) -> AppResult<(StatusCode, Json<ApiResponse<Message>>)> {
    let message = state.services.messages.send(id, request, &claims).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Message sent", message)))
}

/// Mark a conversation read
#[utoipa::path(
    post,
    path = "/conversations/{id}/read",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Marked read", body = ApiResponse<String>),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn mark_conversation_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<String>>> {
    state.services.messages.mark_read(id, &claims).await?;
    Ok(ApiResponse::new("Marked read", "ok".to_string()))
}
