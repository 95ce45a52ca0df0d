//! Course endpoints: CRUD, enrollments, schedule

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        course::{
            Course, CourseDetails, CourseQuery, CreateCourse, CreateScheduleSlot, Enrollment,
            EnrollStudent, ScheduleQuery, ScheduleSlot, ScheduleSlotDetails, UpdateCourse,
        },
        student::StudentShort,
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// List courses with search and pagination
#[utoipa::path(
    get,
    path = "/courses",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(CourseQuery),
    responses(
        (status = 200, description = "List of courses", body = ApiResponse<Vec<CourseDetails>>)
    )
)]
pub async fn list_courses(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<CourseQuery>,
) -> AppResult<Json<ApiResponse<Vec<CourseDetails>>>> {
    let (courses, total) = state.services.courses.search(&query).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Courses", courses, pagination))
}

/// Get course details by ID
#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course details", body = ApiResponse<CourseDetails>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CourseDetails>>> {
    let course = state.services.courses.get_details(id).await?;
    Ok(ApiResponse::new("Course", course))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/courses",
    tag = "courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourse,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<Course>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Course code already exists")
    )
)]
pub async fn create_course(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    claims.require_admin()?;

    let course = state.services.courses.create(request).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Course created", course)))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/courses/{id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = UpdateCourse,
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<Course>),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Capacity below current enrollment")
    )
)]
pub async fn update_course(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateCourse>,
) -> AppResult<Json<ApiResponse<Course>>> {
    claims.require_admin()?;

    let course = state.services.courses.update(id, request).await?;
    Ok(ApiResponse::new("Course updated", course))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.courses.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Enrollments ----

/// Enroll a student in a course
#[utoipa::path(
    post,
    path = "/courses/{id}/enrollments",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = EnrollStudent,
    responses(
        (status = 201, description = "Student enrolled", body = ApiResponse<Enrollment>),
        (status = 404, description = "Course or student not found"),
        (status = 409, description = "Already enrolled"),
        (status = 422, description = "Course is full")
    )
)]
pub async fn enroll_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<EnrollStudent>,
) -> AppResult<(StatusCode, Json<ApiResponse<Enrollment>>)> {
    claims.require_staff()?;

    let enrollment = state.services.courses.enroll(id, request.student_id).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Student enrolled", enrollment)))
}

/// Drop a student from a course
#[utoipa::path(
    delete,
    path = "/courses/{id}/enrollments/{student_id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("student_id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Enrollment dropped"),
        (status = 404, description = "No active enrollment")
    )
)]
pub async fn drop_enrollment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, student_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.courses.drop_enrollment(id, student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active roster for a course
#[utoipa::path(
    get,
    path = "/courses/{id}/enrollments",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Enrolled students", body = ApiResponse<Vec<StudentShort>>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn course_roster(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<StudentShort>>>> {
    claims.require_staff()?;

    let roster = state.services.courses.roster(id).await?;
    Ok(ApiResponse::new("Roster", roster))
}

// ---- Schedule ----

/// Weekly slots for a course
#[utoipa::path(
    get,
    path = "/courses/{id}/schedule",
    tag = "schedule",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Schedule slots", body = ApiResponse<Vec<ScheduleSlot>>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn course_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<ScheduleSlot>>>> {
    let slots = state.services.courses.list_slots(id).await?;
    Ok(ApiResponse::new("Schedule", slots))
}

/// Add a weekly slot to a course
#[utoipa::path(
    post,
    path = "/courses/{id}/schedule",
    tag = "schedule",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = CreateScheduleSlot,
    responses(
        (status = 201, description = "Slot created", body = ApiResponse<ScheduleSlot>),
        (status = 400, description = "Invalid day or time"),
        (status = 409, description = "Slot overlaps an existing slot")
    )
)]
pub async fn create_schedule_slot(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<CreateScheduleSlot>,
) -> AppResult<(StatusCode, Json<ApiResponse<ScheduleSlot>>)> {
    claims.require_staff()?;

    let slot = state.services.courses.create_slot(id, request).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Slot created", slot)))
}

/// Remove a schedule slot
#[utoipa::path(
    delete,
    path = "/schedule/{slot_id}",
    tag = "schedule",
    security(("bearer_auth" = [])),
    params(
        ("slot_id" = i32, Path, description = "Slot ID")
    ),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 404, description = "Slot not found")
    )
)]
pub async fn delete_schedule_slot(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(slot_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.courses.delete_slot(slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Timetable across courses (filter by day, room, teacher)
#[utoipa::path(
    get,
    path = "/schedule",
    tag = "schedule",
    security(("bearer_auth" = [])),
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Timetable", body = ApiResponse<Vec<ScheduleSlotDetails>>)
    )
)]
pub async fn timetable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<ApiResponse<Vec<ScheduleSlotDetails>>>> {
    let slots = state.services.courses.timetable(&query).await?;
    Ok(ApiResponse::new("Timetable", slots))
}
