//! Teacher profile model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Teacher profile joined with its user row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: i32,
    pub user_id: i32,
    pub employee_id: String,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub hire_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Teacher query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TeacherQuery {
    /// Search in name or employee ID
    pub search: Option<String>,
    pub department: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Update teacher profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacher {
    #[validate(length(min = 1, max = 32, message = "Employee ID must be 1-32 characters"))]
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub qualification: Option<String>,
    /// YYYY-MM-DD
    pub hire_date: Option<String>,
}
