//! Gamification service: points, badges, quizzes

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        gamification::{
            grade_answers, points_for_attempt, AwardPoints, Badge, CreateBadge, CreateQuiz,
            LeaderboardEntry, PointsSummary, Quiz, QuizAttempt, QuizQuery, QuizQuestion,
            QuizQuestionPublic, SubmitQuiz, UserBadge,
        },
        notification::NotificationKind,
        user::UserClaims,
    },
    repository::Repository,
    services::notifications::NotificationsService,
};

#[derive(Clone)]
pub struct GamificationService {
    repository: Repository,
    notifications: NotificationsService,
}

impl GamificationService {
    pub fn new(repository: Repository, notifications: NotificationsService) -> Self {
        Self { repository, notifications }
    }

    // ---- Points ----

    /// Staff-awarded points
    pub async fn award_points(&self, data: AwardPoints, awarded_by: i32) -> AppResult<PointsSummary> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.users.get_by_id(data.user_id).await?;

        let (_, new_badges) = self
            .repository
            .gamification
            .award_points(data.user_id, data.points, &data.reason, Some(awarded_by))
            .await?;

        self.announce_badges(data.user_id, &new_badges).await;
        self.points(data.user_id).await
    }

    /// Balance + history for a user
    pub async fn points(&self, user_id: i32) -> AppResult<PointsSummary> {
        self.repository.users.get_by_id(user_id).await?;
        let balance = self.repository.gamification.balance(user_id).await?;
        let history = self.repository.gamification.history(user_id).await?;
        Ok(PointsSummary { user_id, balance, history })
    }

    /// Top balances
    pub async fn leaderboard(&self, limit: i64) -> AppResult<Vec<LeaderboardEntry>> {
        self.repository.gamification.leaderboard(limit).await
    }

    // ---- Badges ----

    pub async fn list_badges(&self) -> AppResult<Vec<Badge>> {
        self.repository.gamification.list_badges().await
    }

    pub async fn create_badge(&self, data: CreateBadge) -> AppResult<Badge> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.gamification.badge_name_exists(&data.name).await? {
            return Err(AppError::Conflict("Badge name already exists".to_string()));
        }
        self.repository.gamification.create_badge(&data).await
    }

    /// Explicit badge award
    pub async fn award_badge(&self, user_id: i32, badge_id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(user_id).await?;
        let badge = self.repository.gamification.get_badge(badge_id).await?;
        self.repository.gamification.award_badge(user_id, badge_id).await?;
        self.announce_badges(user_id, std::slice::from_ref(&badge)).await;
        Ok(())
    }

    pub async fn badges_for_user(&self, user_id: i32) -> AppResult<Vec<UserBadge>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.gamification.badges_for_user(user_id).await
    }

    // ---- Quizzes ----

    pub async fn create_quiz(&self, data: CreateQuiz, created_by: i32) -> AppResult<Quiz> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(course_id) = data.course_id {
            self.repository.courses.get_by_id(course_id).await?;
        }
        self.repository.gamification.create_quiz(&data, created_by).await
    }

    /// List quizzes; non-staff see published ones only
    pub async fn list_quizzes(&self, query: &QuizQuery, claims: &UserClaims) -> AppResult<(Vec<Quiz>, i64)> {
        self.repository
            .gamification
            .list_quizzes(query, !claims.is_staff())
            .await
    }

    /// A quiz with its questions. Correct answers are stripped for non-staff.
    pub async fn get_quiz(
        &self,
        id: i32,
        claims: &UserClaims,
    ) -> AppResult<(Quiz, Vec<QuizQuestionPublic>, Option<Vec<QuizQuestion>>)> {
        let quiz = self.repository.gamification.get_quiz(id).await?;
        if !quiz.published && !claims.is_staff() {
            return Err(AppError::NotFound(format!("Quiz with id {} not found", id)));
        }

        let questions = self.repository.gamification.questions(id).await?;
        let public: Vec<QuizQuestionPublic> =
            questions.iter().cloned().map(Into::into).collect();
        let full = claims.is_staff().then_some(questions);

        Ok((quiz, public, full))
    }

    /// Grade a submission. One attempt per user; points are scaled by score.
    pub async fn submit(&self, quiz_id: i32, data: SubmitQuiz, claims: &UserClaims) -> AppResult<QuizAttempt> {
        let quiz = self.repository.gamification.get_quiz(quiz_id).await?;
        if !quiz.published {
            return Err(AppError::BusinessRule("Quiz is not published".to_string()));
        }

        if self
            .repository
            .gamification
            .attempt_exists(quiz_id, claims.user_id)
            .await?
        {
            return Err(AppError::Conflict("Quiz already attempted".to_string()));
        }

        let questions = self.repository.gamification.questions(quiz_id).await?;
        let (score, total) = grade_answers(&questions, &data.answers);

        let attempt = self
            .repository
            .gamification
            .insert_attempt(quiz_id, claims.user_id, score, total)
            .await?;

        let points = points_for_attempt(quiz.points_reward, score, total);
        if points > 0 {
            let reason = format!("Quiz: {}", quiz.title);
            let (_, new_badges) = self
                .repository
                .gamification
                .award_points(claims.user_id, points, &reason, None)
                .await?;
            self.announce_badges(claims.user_id, &new_badges).await;
        }

        Ok(attempt)
    }

    /// Badge notifications are best-effort
    async fn announce_badges(&self, user_id: i32, badges: &[Badge]) {
        for badge in badges {
            let body = badge.description.clone();
            if let Err(e) = self
                .notifications
                .notify(
                    user_id,
                    NotificationKind::BadgeAwarded,
                    &format!("Badge earned: {}", badge.name),
                    body.as_deref(),
                )
                .await
            {
                tracing::warn!(user_id, badge = %badge.name, "Failed to record badge notification: {}", e);
            }
        }
    }
}
