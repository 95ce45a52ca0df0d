//! Gamification endpoints: points, badges, quizzes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::gamification::{
        AwardPoints, Badge, CreateBadge, CreateQuiz, LeaderboardEntry, PointsSummary, Quiz,
        QuizAttempt, QuizQuery, QuizQuestion, QuizQuestionPublic, SubmitQuiz, UserBadge,
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaderboardQuery {
    /// Number of rows (default 10, max 100)
    pub limit: Option<i64>,
}

/// Quiz payload with questions; answers are present for staff only
#[derive(Serialize, ToSchema)]
pub struct QuizResponse {
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestionPublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions_with_answers: Option<Vec<QuizQuestion>>,
}

/// Award points to a user (staff)
#[utoipa::path(
    post,
    path = "/gamification/points",
    tag = "gamification",
    security(("bearer_auth" = [])),
    request_body = AwardPoints,
    responses(
        (status = 201, description = "Points awarded", body = ApiResponse<PointsSummary>),
        (status = 404, description = "User not found")
    )
)]
pub async fn award_points(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<AwardPoints>,
) -> AppResult<(StatusCode, Json<ApiResponse<PointsSummary>>)> {
    claims.require_staff()?;

    let summary = state
        .services
        .gamification
        .award_points(request, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Points awarded", summary)))
}

/// Points balance and history for a user
#[utoipa::path(
    get,
    path = "/users/{id}/points",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Points summary", body = ApiResponse<PointsSummary>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_points(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<PointsSummary>>> {
    claims.require_self_or_staff(id)?;

    let summary = state.services.gamification.points(id).await?;
    Ok(ApiResponse::new("Points", summary))
}

/// Leaderboard of top balances
#[utoipa::path(
    get,
    path = "/gamification/leaderboard",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard", body = ApiResponse<Vec<LeaderboardEntry>>)
    )
)]
pub async fn leaderboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let entries = state
        .services
        .gamification
        .leaderboard(query.limit.unwrap_or(10))
        .await?;
    Ok(ApiResponse::new("Leaderboard", entries))
}

/// List badge definitions
#[utoipa::path(
    get,
    path = "/badges",
    tag = "gamification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Badges", body = ApiResponse<Vec<Badge>>)
    )
)]
pub async fn list_badges(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Badge>>>> {
    let badges = state.services.gamification.list_badges().await?;
    Ok(ApiResponse::new("Badges", badges))
}

/// Create a badge
#[utoipa::path(
    post,
    path = "/badges",
    tag = "gamification",
    security(("bearer_auth" = [])),
    request_body = CreateBadge,
    responses(
        (status = 201, description = "Badge created", body = ApiResponse<Badge>),
        (status = 409, description = "Badge name already exists")
    )
)]
pub async fn create_badge(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBadge>,
) -> AppResult<(StatusCode, Json<ApiResponse<Badge>>)> {
    claims.require_admin()?;

    let badge = state.services.gamification.create_badge(request).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Badge created", badge)))
}

/// Award a badge to a user
#[utoipa::path(
    post,
    path = "/users/{id}/badges/{badge_id}",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("badge_id" = i32, Path, description = "Badge ID")
    ),
    responses(
        (status = 201, description = "Badge awarded"),
        (status = 404, description = "User or badge not found"),
        (status = 409, description = "User already holds this badge")
    )
)]
pub async fn award_badge(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, badge_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.gamification.award_badge(id, badge_id).await?;
    Ok(StatusCode::CREATED)
}

/// Badges held by a user
#[utoipa::path(
    get,
    path = "/users/{id}/badges",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's badges", body = ApiResponse<Vec<UserBadge>>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_badges(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<UserBadge>>>> {
    claims.require_self_or_staff(id)?;

    let badges = state.services.gamification.badges_for_user(id).await?;
    Ok(ApiResponse::new("Badges", badges))
}

/// Create a quiz with questions
#[utoipa::path(
    post,
    path = "/quizzes",
    tag = "gamification",
    security(("bearer_auth" = [])),
    request_body = CreateQuiz,
    responses(
        (status = 201, description = "Quiz created", body = ApiResponse<Quiz>),
        (status = 400, description = "Invalid questions"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_quiz(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateQuiz>,
) -> AppResult<(StatusCode, Json<ApiResponse<Quiz>>)> {
    claims.require_staff()?;

    let quiz = state
        .services
        .gamification
        .create_quiz(request, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Quiz created", quiz)))
}

/// List quizzes (students see published ones only)
#[utoipa::path(
    get,
    path = "/quizzes",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(QuizQuery),
    responses(
        (status = 200, description = "Quizzes", body = ApiResponse<Vec<Quiz>>)
    )
)]
pub async fn list_quizzes(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<QuizQuery>,
) -> AppResult<Json<ApiResponse<Vec<Quiz>>>> {
    let (quizzes, total) = state.services.gamification.list_quizzes(&query, &claims).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Quizzes", quizzes, pagination))
}

/// A quiz with its questions
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz", body = ApiResponse<QuizResponse>),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn get_quiz(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<QuizResponse>>> {
    let (quiz, questions, questions_with_answers) =
        state.services.gamification.get_quiz(id, &claims).await?;

    Ok(ApiResponse::new(
        "Quiz",
        QuizResponse {
            quiz,
            questions,
            questions_with_answers,
        },
    ))
}

/// Submit quiz answers (one attempt per user)
#[utoipa::path(
    post,
    path = "/quizzes/{id}/submit",
    tag = "gamification",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Quiz ID")
    ),
    request_body = SubmitQuiz,
    responses(
        (status = 201, description = "Attempt graded", body = ApiResponse<QuizAttempt>),
        (status = 404, description = "Quiz not found"),
        (status = 409, description = "Already attempted"),
        (status = 422, description = "Quiz is not published")
    )
)]
pub async fn submit_quiz(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<SubmitQuiz>,
) -> AppResult<(StatusCode, Json<ApiResponse<QuizAttempt>>)> {
    let attempt = state.services.gamification.submit(id, request, &claims).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Attempt graded", attempt)))
}
