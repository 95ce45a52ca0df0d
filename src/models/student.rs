//! Student profile model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::user::Role;

/// Student profile joined with its user row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: i32,
    pub user_id: i32,
    pub roll_number: String,
    pub class_level: String,
    pub section: Option<String>,
    pub admission_date: NaiveDate,
    pub notes: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Short student representation for rosters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentShort {
    pub id: i32,
    pub user_id: i32,
    pub roll_number: String,
    pub class_level: String,
    pub first_name: String,
    pub last_name: String,
}

/// Student query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StudentQuery {
    /// Search in name or roll number
    pub search: Option<String>,
    pub class_level: Option<String>,
    pub section: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Update student profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudent {
    #[validate(length(min = 1, max = 32, message = "Roll number must be 1-32 characters"))]
    pub roll_number: Option<String>,
    pub class_level: Option<String>,
    pub section: Option<String>,
    /// YYYY-MM-DD
    pub admission_date: Option<String>,
    pub notes: Option<String>,
}

/// Link a parent to a student
#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkParent {
    pub parent_user_id: i32,
}

/// Parent profile joined with its user row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Parent {
    pub id: i32,
    pub user_id: i32,
    pub occupation: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Guard helper: which students a claims-holder may read
pub fn can_read_student(role: Role, claims_user_id: i32, student_user_id: i32, is_linked_parent: bool) -> bool {
    match role {
        Role::Admin | Role::Teacher | Role::Librarian => true,
        Role::Student => claims_user_id == student_user_id,
        Role::Parent => is_linked_parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_reads_only_own_record() {
        assert!(can_read_student(Role::Student, 5, 5, false));
        assert!(!can_read_student(Role::Student, 5, 6, false));
    }

    #[test]
    fn parent_needs_link() {
        assert!(can_read_student(Role::Parent, 9, 5, true));
        assert!(!can_read_student(Role::Parent, 9, 5, false));
    }

    #[test]
    fn staff_reads_everything() {
        assert!(can_read_student(Role::Teacher, 1, 5, false));
        assert!(can_read_student(Role::Admin, 1, 5, false));
    }
}
