//! Student endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        course::CourseDetails,
        student::{LinkParent, Parent, Student, StudentQuery, StudentShort, UpdateStudent},
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// List students with search and pagination
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    params(StudentQuery),
    responses(
        (status = 200, description = "List of students", body = ApiResponse<Vec<StudentShort>>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StudentQuery>,
) -> AppResult<Json<ApiResponse<Vec<StudentShort>>>> {
    claims.require_staff()?;

    let (students, total) = state.services.students.search(&query).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Students", students, pagination))
}

/// Get the authenticated user's own student profile
#[utoipa::path(
    get,
    path = "/students/me",
    tag = "students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own student profile", body = ApiResponse<Student>),
        (status = 404, description = "No student profile for this account")
    )
)]
pub async fn my_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Student>>> {
    let student = state.services.students.for_claims(&claims).await?;
    Ok(ApiResponse::new("Student", student))
}

/// Get student details by ID
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = ApiResponse<Student>),
        (status = 403, description = "Access to this record is not allowed"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Student>>> {
    let student = state.services.students.get_checked(id, &claims).await?;
    Ok(ApiResponse::new("Student", student))
}

/// Update a student profile
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = ApiResponse<Student>),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Roll number already exists")
    )
)]
pub async fn update_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStudent>,
) -> AppResult<Json<ApiResponse<Student>>> {
    claims.require_staff()?;

    let student = state.services.students.update(id, request).await?;
    Ok(ApiResponse::new("Student updated", student))
}

/// Courses the student is enrolled in
#[utoipa::path(
    get,
    path = "/students/{id}/courses",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Active enrollments", body = ApiResponse<Vec<CourseDetails>>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn student_courses(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<CourseDetails>>>> {
    let courses = state.services.students.courses(id, &claims).await?;
    Ok(ApiResponse::new("Courses", courses))
}

/// Parents linked to a student
#[utoipa::path(
    get,
    path = "/students/{id}/parents",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Linked parents", body = ApiResponse<Vec<Parent>>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn student_parents(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<Parent>>>> {
    let parents = state.services.students.parents(id, &claims).await?;
    Ok(ApiResponse::new("Parents", parents))
}

/// Link a parent account to a student
#[utoipa::path(
    post,
    path = "/students/{id}/parents",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    request_body = LinkParent,
    responses(
        (status = 201, description = "Parent linked"),
        (status = 404, description = "Student or parent not found"),
        (status = 409, description = "Already linked")
    )
)]
pub async fn link_parent(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<LinkParent>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.students.link_parent(id, request).await?;
    Ok(StatusCode::CREATED)
}
