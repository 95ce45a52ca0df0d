//! API handlers for Ardesia REST endpoints

pub mod attendance;
pub mod auth;
pub mod books;
pub mod courses;
pub mod events;
pub mod gamification;
pub mod grades;
pub mod health;
pub mod loans;
pub mod messages;
pub mod notifications;
pub mod openapi;
pub mod reservations;
pub mod settings;
pub mod stats;
pub mod students;
pub mod teachers;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication("Invalid authorization header format".to_string()));
        }

        let token = &auth_header[7..];

        // Validate JWT token using the secret from configuration
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Pagination metadata for list responses
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>, total: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(20).clamp(1, 100);
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page * limit < total,
            has_prev: page > 1 && total > 0,
        }
    }
}

/// Uniform success envelope
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
        })
    }

    pub fn paginated(message: impl Into<String>, data: T, pagination: Pagination) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
            pagination: Some(pagination),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_reports_has_next_correctly() {
        let p = Pagination::new(Some(1), Some(20), 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(Some(3), Some(20), 45);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn pagination_exact_fit_has_no_next() {
        let p = Pagination::new(Some(2), Some(20), 40);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
    }

    #[test]
    fn pagination_empty_set() {
        let p = Pagination::new(None, None, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn pagination_clamps_inputs() {
        let p = Pagination::new(Some(0), Some(1000), 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);
    }
}
