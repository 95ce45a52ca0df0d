//! Attendance endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::attendance::{
        AttendanceQuery, AttendanceRecord, AttendanceSummary, RecordAttendance, UpdateAttendance,
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// Record an attendance sheet for one course and date (bulk upsert)
#[utoipa::path(
    post,
    path = "/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    request_body = RecordAttendance,
    responses(
        (status = 201, description = "Sheet recorded", body = ApiResponse<Vec<AttendanceRecord>>),
        (status = 400, description = "Invalid date or student not enrolled"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn record_attendance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<RecordAttendance>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<AttendanceRecord>>>)> {
    claims.require_staff()?;

    let records = state
        .services
        .attendance
        .record(request, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Attendance recorded", records)))
}

/// Correct a single attendance record
#[utoipa::path(
    put,
    path = "/attendance/{id}",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Record updated", body = ApiResponse<AttendanceRecord>),
        (status = 404, description = "Record not found")
    )
)]
pub async fn update_attendance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateAttendance>,
) -> AppResult<Json<ApiResponse<AttendanceRecord>>> {
    claims.require_staff()?;

    let record = state.services.attendance.update(id, request).await?;
    Ok(ApiResponse::new("Attendance updated", record))
}

/// Query attendance records
#[utoipa::path(
    get,
    path = "/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records", body = ApiResponse<Vec<AttendanceRecord>>)
    )
)]
pub async fn list_attendance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AttendanceQuery>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceRecord>>>> {
    claims.require_staff()?;

    let (records, total) = state.services.attendance.search(&query).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Attendance", records, pagination))
}

/// Attendance summary for a student
#[utoipa::path(
    get,
    path = "/students/{id}/attendance/summary",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Per-status counts and rate", body = ApiResponse<AttendanceSummary>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn attendance_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<AttendanceSummary>>> {
    // Students/parents may read their own; checked against the profile
    state.services.students.get_checked(id, &claims).await?;

    let summary = state.services.attendance.summary(id).await?;
    Ok(ApiResponse::new("Attendance summary", summary))
}
