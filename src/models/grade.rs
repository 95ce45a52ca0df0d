//! Grade models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Assessment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Exam,
    Quiz,
    Homework,
    Project,
}

impl Assessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Assessment::Exam => "exam",
            Assessment::Quiz => "quiz",
            Assessment::Homework => "homework",
            Assessment::Project => "project",
        }
    }
}

/// Grade record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub assessment: String,
    pub title: String,
    pub score: f64,
    pub max_score: f64,
    pub term: String,
    pub comment: Option<String>,
    pub graded_by: Option<i32>,
    pub graded_at: DateTime<Utc>,
}

/// Create grade request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGrade {
    pub student_id: i32,
    pub course_id: i32,
    pub assessment: Assessment,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub score: f64,
    pub max_score: f64,
    #[validate(length(min = 1, max = 32, message = "Term must be 1-32 characters"))]
    pub term: String,
    pub comment: Option<String>,
}

/// Update grade request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGrade {
    pub title: Option<String>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub comment: Option<String>,
}

/// Grade query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct GradeQuery {
    pub term: Option<String>,
    pub course_id: Option<i32>,
    pub assessment: Option<Assessment>,
}

/// Per-course average for a transcript
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CourseAverage {
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    /// Mean of score/max_score over graded work, as a percentage
    pub average_percent: f64,
    pub grade_count: i64,
}

/// Student transcript: all grades plus per-course averages
#[derive(Debug, Serialize, ToSchema)]
pub struct Transcript {
    pub student_id: i32,
    pub grades: Vec<Grade>,
    pub course_averages: Vec<CourseAverage>,
}

/// Course gradebook: all grades plus the class average
#[derive(Debug, Serialize, ToSchema)]
pub struct Gradebook {
    pub course_id: i32,
    pub grades: Vec<Grade>,
    /// Mean of score/max_score over the listed grades, as a percentage
    pub class_average_percent: Option<f64>,
}

/// Validate score bounds: 0 <= score <= max_score, max_score > 0
pub fn check_score_bounds(score: f64, max_score: f64) -> Result<(), String> {
    if max_score <= 0.0 {
        return Err("max_score must be positive".to_string());
    }
    if score < 0.0 || score > max_score {
        return Err(format!("score must be between 0 and {}", max_score));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds() {
        assert!(check_score_bounds(0.0, 10.0).is_ok());
        assert!(check_score_bounds(10.0, 10.0).is_ok());
        assert!(check_score_bounds(10.5, 10.0).is_err());
        assert!(check_score_bounds(-0.5, 10.0).is_err());
        assert!(check_score_bounds(5.0, 0.0).is_err());
    }
}
