//! Grade endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::grade::{CreateGrade, Grade, Gradebook, GradeQuery, Transcript, UpdateGrade},
};

use super::{ApiResponse, AuthenticatedUser};

/// Record a grade
#[utoipa::path(
    post,
    path = "/grades",
    tag = "grades",
    security(("bearer_auth" = [])),
    request_body = CreateGrade,
    responses(
        (status = 201, description = "Grade recorded", body = ApiResponse<Grade>),
        (status = 400, description = "Score out of bounds or student not enrolled"),
        (status = 404, description = "Student or course not found")
    )
)]
pub async fn create_grade(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateGrade>,
) -> AppResult<(StatusCode, Json<ApiResponse<Grade>>)> {
    claims.require_staff()?;

    let grade = state.services.grades.create(request, claims.user_id).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Grade recorded", grade)))
}

/// Update a grade
#[utoipa::path(
    put,
    path = "/grades/{id}",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Grade ID")
    ),
    request_body = UpdateGrade,
    responses(
        (status = 200, description = "Grade updated", body = ApiResponse<Grade>),
        (status = 400, description = "Score out of bounds"),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn update_grade(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateGrade>,
) -> AppResult<Json<ApiResponse<Grade>>> {
    claims.require_staff()?;

    let grade = state.services.grades.update(id, request).await?;
    Ok(ApiResponse::new("Grade updated", grade))
}

/// Delete a grade
#[utoipa::path(
    delete,
    path = "/grades/{id}",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Grade ID")
    ),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn delete_grade(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.grades.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Transcript for a student
#[utoipa::path(
    get,
    path = "/students/{id}/grades",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID"),
        GradeQuery
    ),
    responses(
        (status = 200, description = "Transcript", body = ApiResponse<Transcript>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn student_grades(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<GradeQuery>,
) -> AppResult<Json<ApiResponse<Transcript>>> {
    state.services.students.get_checked(id, &claims).await?;

    let transcript = state.services.grades.transcript(id, &query).await?;
    Ok(ApiResponse::new("Transcript", transcript))
}

/// Gradebook for a course
#[utoipa::path(
    get,
    path = "/courses/{id}/grades",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID"),
        GradeQuery
    ),
    responses(
        (status = 200, description = "Gradebook", body = ApiResponse<Gradebook>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn course_grades(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<GradeQuery>,
) -> AppResult<Json<ApiResponse<Gradebook>>> {
    claims.require_staff()?;

    let gradebook = state.services.grades.gradebook(id, &query).await?;
    Ok(ApiResponse::new("Gradebook", gradebook))
}
