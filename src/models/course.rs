//! Course, enrollment and schedule slot models

use chrono::{DateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Course codes: 2-8 uppercase letters followed by 2-4 digits (e.g. MATH101)
static COURSE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,8}[0-9]{2,4}$").unwrap());

pub fn is_valid_course_code(code: &str) -> bool {
    COURSE_CODE_RE.is_match(code)
}

/// Course model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub credits: i16,
    pub capacity: i32,
    pub teacher_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Course with teacher name and enrollment count for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseDetails {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub credits: i16,
    pub capacity: i32,
    pub teacher_id: Option<i32>,
    pub teacher_name: Option<String>,
    pub enrolled: i64,
}

/// Course query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CourseQuery {
    /// Search in code or name
    pub search: Option<String>,
    pub department: Option<String>,
    pub teacher_id: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create course request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourse {
    #[validate(length(min = 4, max = 12, message = "Course code must be 4-12 characters"))]
    pub code: String,
    #[validate(length(min = 1, message = "Course name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    #[validate(range(min = 1, max = 20, message = "Credits must be 1-20"))]
    pub credits: Option<i16>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub teacher_id: Option<i32>,
}

/// Update course request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    #[validate(range(min = 1, max = 20, message = "Credits must be 1-20"))]
    pub credits: Option<i16>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub teacher_id: Option<i32>,
}

/// Enrollment status values: active, dropped, completed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
    pub dropped_at: Option<DateTime<Utc>>,
}

/// Enroll request
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollStudent {
    pub student_id: i32,
}

/// A weekly schedule slot for a course
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleSlot {
    pub id: i32,
    pub course_id: i32,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
}

/// Schedule slot with course code/name for timetable views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleSlotDetails {
    pub id: i32,
    pub course_id: i32,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
    pub course_code: String,
    pub course_name: String,
}

/// Create schedule slot request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleSlot {
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: i16,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
    pub room: String,
}

/// Query parameters for timetable views
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ScheduleQuery {
    pub day_of_week: Option<i16>,
    pub room: Option<String>,
    pub teacher_id: Option<i32>,
    pub course_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_code_shape() {
        assert!(is_valid_course_code("MATH101"));
        assert!(is_valid_course_code("CS42"));
        assert!(!is_valid_course_code("math101"));
        assert!(!is_valid_course_code("M1"));
        assert!(!is_valid_course_code("MATH-101"));
    }
}
