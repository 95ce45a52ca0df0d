//! Notification endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::notification::{
        BroadcastNotification, Notification, NotificationQuery, UnreadCount,
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// Broadcast result payload
#[derive(Serialize, ToSchema)]
pub struct BroadcastResponse {
    pub recipients: i64,
}

/// Own notifications
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<Notification>>)
    )
)]
pub async fn list_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let (notifications, total) = state
        .services
        .notifications
        .for_user(claims.user_id, &query)
        .await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Notifications", notifications, pagination))
}

/// Unread counter
#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = ApiResponse<UnreadCount>)
    )
)]
pub async fn unread_count(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let unread = state.services.notifications.unread_count(claims.user_id).await?;
    Ok(ApiResponse::new("Unread count", UnreadCount { unread }))
}

/// Mark one notification read
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked read", body = ApiResponse<Notification>),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = state
        .services
        .notifications
        .mark_read(id, claims.user_id)
        .await?;
    Ok(ApiResponse::new("Marked read", notification))
}

/// Mark all notifications read
#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All marked read", body = ApiResponse<UnreadCount>)
    )
)]
pub async fn mark_all_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    state.services.notifications.mark_all_read(claims.user_id).await?;
    Ok(ApiResponse::new("All marked read", UnreadCount { unread: 0 }))
}

/// Staff broadcast to a role or everyone
#[utoipa::path(
    post,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = BroadcastNotification,
    responses(
        (status = 201, description = "Broadcast sent", body = ApiResponse<BroadcastResponse>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn broadcast(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BroadcastNotification>,
) -> AppResult<(StatusCode, Json<ApiResponse<BroadcastResponse>>)> {
    claims.require_staff()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let recipients = state.services.notifications.broadcast(&request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::new("Broadcast sent", BroadcastResponse { recipients }),
    ))
}
