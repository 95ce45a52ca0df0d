//! System settings endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::setting::{Settings, UpdateSettings},
};

use super::{ApiResponse, AuthenticatedUser};

/// Current settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Settings", body = ApiResponse<Settings>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Settings>>> {
    claims.require_admin()?;

    let settings = state.services.settings.get().await?;
    Ok(ApiResponse::new("Settings", settings))
}

/// Update settings (partial)
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<Settings>),
        (status = 400, description = "Invalid value"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn update_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateSettings>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    claims.require_admin()?;

    let settings = state.services.settings.update(request).await?;
    Ok(ApiResponse::new("Settings updated", settings))
}
