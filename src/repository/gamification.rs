//! Gamification repository: points ledger, badges, quizzes

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::gamification::{
        Badge, CreateBadge, CreateQuiz, LeaderboardEntry, PointAward, Quiz, QuizAttempt,
        QuizQuery, QuizQuestion, UserBadge,
    },
};

use super::page_bounds;

#[derive(Clone)]
pub struct GamificationRepository {
    pool: Pool<Postgres>,
}

impl GamificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // ---- Points ----

    /// Credit points to a user and auto-award any badge whose threshold the
    /// new balance crosses. Returns the entry and the names of badges awarded.
    pub async fn award_points(
        &self,
        user_id: i32,
        points: i32,
        reason: &str,
        awarded_by: Option<i32>,
    ) -> AppResult<(PointAward, Vec<Badge>)> {
        let mut tx = self.pool.begin().await?;

        let award = sqlx::query_as::<_, PointAward>(
            r#"
            INSERT INTO point_awards (user_id, points, reason, awarded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(points)
        .bind(reason)
        .bind(awarded_by)
        .fetch_one(&mut *tx)
        .await?;

        let balance: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0) FROM point_awards WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // Threshold badges not yet held, now within reach
        let new_badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT b.* FROM badges b
            WHERE b.points_required > 0
              AND b.points_required <= $1
              AND NOT EXISTS (
                  SELECT 1 FROM user_badges ub
                  WHERE ub.badge_id = b.id AND ub.user_id = $2
              )
            ORDER BY b.points_required
            "#,
        )
        .bind(balance)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        for badge in &new_badges {
            sqlx::query("INSERT INTO user_badges (user_id, badge_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(badge.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok((award, new_badges))
    }

    /// Points balance for a user
    pub async fn balance(&self, user_id: i32) -> AppResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0) FROM point_awards WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(balance)
    }

    /// Ledger history for a user, newest first
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<PointAward>> {
        let rows = sqlx::query_as::<_, PointAward>(
            "SELECT * FROM point_awards WHERE user_id = $1 ORDER BY awarded_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Top balances
    pub async fn leaderboard(&self, limit: i64) -> AppResult<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT p.user_id, u.first_name, u.last_name, SUM(p.points) AS balance
            FROM point_awards p
            JOIN users u ON p.user_id = u.id
            GROUP BY p.user_id, u.first_name, u.last_name
            ORDER BY balance DESC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---- Badges ----

    pub async fn list_badges(&self) -> AppResult<Vec<Badge>> {
        let rows = sqlx::query_as::<_, Badge>("SELECT * FROM badges ORDER BY points_required, name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn badge_name_exists(&self, name: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM badges WHERE LOWER(name) = LOWER($1))")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn create_badge(&self, data: &CreateBadge) -> AppResult<Badge> {
        let badge = sqlx::query_as::<_, Badge>(
            r#"
            INSERT INTO badges (name, description, icon, points_required)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.icon)
        .bind(data.points_required.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(badge)
    }

    pub async fn get_badge(&self, id: i32) -> AppResult<Badge> {
        sqlx::query_as::<_, Badge>("SELECT * FROM badges WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Badge with id {} not found", id)))
    }

    /// Explicitly award a badge to a user
    pub async fn award_badge(&self, user_id: i32, badge_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO user_badges (user_id, badge_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("User already holds this badge".to_string()));
        }
        Ok(())
    }

    /// Badges held by a user
    pub async fn badges_for_user(&self, user_id: i32) -> AppResult<Vec<UserBadge>> {
        let rows = sqlx::query_as::<_, UserBadge>(
            r#"
            SELECT b.id AS badge_id, b.name, b.description, b.icon, ub.awarded_at
            FROM user_badges ub
            JOIN badges b ON ub.badge_id = b.id
            WHERE ub.user_id = $1
            ORDER BY ub.awarded_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---- Quizzes ----

    /// Create a quiz with its questions in one transaction
    pub async fn create_quiz(&self, data: &CreateQuiz, created_by: i32) -> AppResult<Quiz> {
        let mut tx = self.pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (title, course_id, points_reward, published, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.course_id)
        .bind(data.points_reward.unwrap_or(0))
        .bind(data.published.unwrap_or(false))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (i, q) in data.questions.iter().enumerate() {
            if q.choices.len() < 2 {
                return Err(AppError::Validation(format!(
                    "Question {} needs at least two choices",
                    i + 1
                )));
            }
            if q.correct_choice < 0 || q.correct_choice as usize >= q.choices.len() {
                return Err(AppError::Validation(format!(
                    "Question {} correct_choice is out of range",
                    i + 1
                )));
            }
            sqlx::query(
                r#"
                INSERT INTO quiz_questions (quiz_id, position, prompt, choices, correct_choice)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(quiz.id)
            .bind(i as i16 + 1)
            .bind(&q.prompt)
            .bind(sqlx::types::Json(&q.choices))
            .bind(q.correct_choice)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quiz)
    }

    pub async fn get_quiz(&self, id: i32) -> AppResult<Quiz> {
        sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id {} not found", id)))
    }

    /// List quizzes, optionally restricted to published ones
    pub async fn list_quizzes(&self, query: &QuizQuery, published_only: bool) -> AppResult<(Vec<Quiz>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        if published_only {
            conditions.push("published = TRUE".to_string());
        }
        if let Some(id) = query.course_id {
            conditions.push(format!("course_id = {}", id));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM quizzes {}", where_clause);
        let total = sqlx::query_scalar::<_, i64>(&count_sql).fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM quizzes {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            where_clause
        );
        let quizzes = sqlx::query_as::<_, Quiz>(&list_sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((quizzes, total))
    }

    /// Questions for a quiz, in order
    pub async fn questions(&self, quiz_id: i32) -> AppResult<Vec<QuizQuestion>> {
        let rows = sqlx::query_as::<_, QuizQuestion>(
            "SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY position",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether the user has already attempted a quiz
    pub async fn attempt_exists(&self, quiz_id: i32, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM quiz_attempts WHERE quiz_id = $1 AND user_id = $2)",
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Store a graded attempt
    pub async fn insert_attempt(
        &self,
        quiz_id: i32,
        user_id: i32,
        score: i32,
        total: i32,
    ) -> AppResult<QuizAttempt> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (quiz_id, user_id, score, total)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(score)
        .bind(total)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }
}
