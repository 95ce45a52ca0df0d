//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    services::stats::{AttendanceDay, StatsResponse},
};

use super::{ApiResponse, AuthenticatedUser};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceSeriesQuery {
    /// Start date (YYYY-MM-DD)
    pub start_date: String,
    /// End date (YYYY-MM-DD)
    pub end_date: String,
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = ApiResponse<StatsResponse>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<StatsResponse>>> {
    claims.require_staff()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(ApiResponse::new("Statistics", stats))
}

/// Daily attendance time series
#[utoipa::path(
    get,
    path = "/stats/attendance",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(AttendanceSeriesQuery),
    responses(
        (status = 200, description = "Attendance per day", body = ApiResponse<Vec<AttendanceDay>>),
        (status = 400, description = "Invalid date range")
    )
)]
pub async fn attendance_series(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AttendanceSeriesQuery>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceDay>>>> {
    claims.require_staff()?;

    let start = NaiveDate::parse_from_str(&query.start_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid start_date (use YYYY-MM-DD)".to_string()))?;
    let end = NaiveDate::parse_from_str(&query.end_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid end_date (use YYYY-MM-DD)".to_string()))?;
    if end < start {
        return Err(AppError::Validation("end_date must not be before start_date".to_string()));
    }

    let series = state.services.stats.attendance_series(start, end).await?;
    Ok(ApiResponse::new("Attendance series", series))
}
