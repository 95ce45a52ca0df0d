//! Gamification models: points, badges, quizzes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One ledger entry in a user's points history
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PointAward {
    pub id: i32,
    pub user_id: i32,
    pub points: i32,
    pub reason: String,
    pub awarded_by: Option<i32>,
    pub awarded_at: DateTime<Utc>,
}

/// Award points request (staff)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AwardPoints {
    pub user_id: i32,
    #[validate(range(min = 1, max = 1000, message = "Points must be 1-1000"))]
    pub points: i32,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
}

/// Points balance with history
#[derive(Debug, Serialize, ToSchema)]
pub struct PointsSummary {
    pub user_id: i32,
    pub balance: i64,
    pub history: Vec<PointAward>,
}

/// Leaderboard row
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub balance: i64,
}

/// Badge definition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Badge {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Points balance at which the badge is awarded automatically (0 = manual only)
    pub points_required: i32,
}

/// Create badge request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBadge {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[validate(range(min = 0, message = "points_required cannot be negative"))]
    pub points_required: Option<i32>,
}

/// A badge held by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserBadge {
    pub badge_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub awarded_at: DateTime<Utc>,
}

/// Quiz header from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Quiz {
    pub id: i32,
    pub title: String,
    pub course_id: Option<i32>,
    pub points_reward: i32,
    pub published: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Quiz question as stored (correct answer included)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QuizQuestion {
    pub id: i32,
    pub quiz_id: i32,
    pub position: i16,
    pub prompt: String,
    /// Choice texts, ordered
    #[schema(value_type = Vec<String>)]
    pub choices: sqlx::types::Json<Vec<String>>,
    pub correct_choice: i16,
}

/// Question as shown to quiz takers (no correct answer)
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizQuestionPublic {
    pub id: i32,
    pub position: i16,
    pub prompt: String,
    pub choices: Vec<String>,
}

impl From<QuizQuestion> for QuizQuestionPublic {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            position: q.position,
            prompt: q.prompt,
            choices: q.choices.0,
        }
    }
}

/// Create quiz request (questions inline)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuiz {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub course_id: Option<i32>,
    #[validate(range(min = 0, max = 1000, message = "points_reward must be 0-1000"))]
    pub points_reward: Option<i32>,
    pub published: Option<bool>,
    #[validate(length(min = 1, message = "At least one question is required"))]
    pub questions: Vec<CreateQuizQuestion>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateQuizQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    /// Index into choices
    pub correct_choice: i16,
}

/// Submit quiz answers: one choice index per question, in question order
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitQuiz {
    pub answers: Vec<i16>,
}

/// Graded attempt
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QuizAttempt {
    pub id: i32,
    pub quiz_id: i32,
    pub user_id: i32,
    pub score: i32,
    pub total: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Quiz list query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct QuizQuery {
    pub course_id: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Grade a set of answers against the stored questions.
/// Missing answers count as wrong; extra answers are ignored.
pub fn grade_answers(questions: &[QuizQuestion], answers: &[i16]) -> (i32, i32) {
    let total = questions.len() as i32;
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i) == Some(&q.correct_choice))
        .count() as i32;
    (score, total)
}

/// Points earned for an attempt: reward scaled by score/total, rounded down
pub fn points_for_attempt(points_reward: i32, score: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    (points_reward as i64 * score as i64 / total as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i32, correct: i16) -> QuizQuestion {
        QuizQuestion {
            id,
            quiz_id: 1,
            position: id as i16,
            prompt: format!("Q{}", id),
            choices: sqlx::types::Json(vec!["a".into(), "b".into(), "c".into()]),
            correct_choice: correct,
        }
    }

    #[test]
    fn grading_counts_exact_matches() {
        let qs = vec![question(1, 0), question(2, 2), question(3, 1)];
        assert_eq!(grade_answers(&qs, &[0, 2, 1]), (3, 3));
        assert_eq!(grade_answers(&qs, &[0, 1, 1]), (2, 3));
        assert_eq!(grade_answers(&qs, &[1, 0, 0]), (0, 3));
    }

    #[test]
    fn missing_answers_are_wrong() {
        let qs = vec![question(1, 0), question(2, 2)];
        assert_eq!(grade_answers(&qs, &[0]), (1, 2));
        assert_eq!(grade_answers(&qs, &[]), (0, 2));
    }

    #[test]
    fn points_scale_with_score() {
        assert_eq!(points_for_attempt(100, 3, 3), 100);
        assert_eq!(points_for_attempt(100, 2, 3), 66);
        assert_eq!(points_for_attempt(100, 0, 3), 0);
        assert_eq!(points_for_attempt(0, 3, 3), 0);
        assert_eq!(points_for_attempt(100, 0, 0), 0);
    }
}
