//! Teacher endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        course::CourseDetails,
        teacher::{Teacher, TeacherQuery, UpdateTeacher},
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// List teachers with search and pagination
#[utoipa::path(
    get,
    path = "/teachers",
    tag = "teachers",
    security(("bearer_auth" = [])),
    params(TeacherQuery),
    responses(
        (status = 200, description = "List of teachers", body = ApiResponse<Vec<Teacher>>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_teachers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<TeacherQuery>,
) -> AppResult<Json<ApiResponse<Vec<Teacher>>>> {
    let (teachers, total) = state.services.teachers.search(&query).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Teachers", teachers, pagination))
}

/// Get teacher details by ID
#[utoipa::path(
    get,
    path = "/teachers/{id}",
    tag = "teachers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher details", body = ApiResponse<Teacher>),
        (status = 404, description = "Teacher not found")
    )
)]
pub async fn get_teacher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Teacher>>> {
    let teacher = state.services.teachers.get_by_id(id).await?;
    Ok(ApiResponse::new("Teacher", teacher))
}

/// Update a teacher profile
#[utoipa::path(
    put,
    path = "/teachers/{id}",
    tag = "teachers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Teacher ID")
    ),
    request_body = UpdateTeacher,
    responses(
        (status = 200, description = "Teacher updated", body = ApiResponse<Teacher>),
        (status = 404, description = "Teacher not found"),
        (status = 409, description = "Employee ID already exists")
    )
)]
pub async fn update_teacher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTeacher>,
) -> AppResult<Json<ApiResponse<Teacher>>> {
    claims.require_admin()?;

    let teacher = state.services.teachers.update(id, request).await?;
    Ok(ApiResponse::new("Teacher updated", teacher))
}

/// Courses taught by a teacher
#[utoipa::path(
    get,
    path = "/teachers/{id}/courses",
    tag = "teachers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Courses taught", body = ApiResponse<Vec<CourseDetails>>),
        (status = 404, description = "Teacher not found")
    )
)]
pub async fn teacher_courses(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<CourseDetails>>>> {
    let courses = state.services.teachers.courses(id).await?;
    Ok(ApiResponse::new("Courses", courses))
}
