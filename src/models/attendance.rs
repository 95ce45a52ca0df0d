//! Attendance models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Attendance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            "excused" => Ok(AttendanceStatus::Excused),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

/// Attendance record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub date: NaiveDate,
    pub status: String,
    pub note: Option<String>,
    pub recorded_by: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

/// One entry in a bulk attendance sheet
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub student_id: i32,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

/// Bulk record request: one course, one date, many students
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordAttendance {
    pub course_id: i32,
    /// YYYY-MM-DD
    pub date: String,
    pub entries: Vec<AttendanceEntry>,
}

/// Correct a single record
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttendance {
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

/// Attendance query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    pub course_id: Option<i32>,
    pub student_id: Option<i32>,
    /// YYYY-MM-DD
    pub date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Per-status counts for a student
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub student_id: i32,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    /// (present + late + excused) / total, 1.0 when no records exist
    pub attendance_rate: f64,
}

impl AttendanceSummary {
    pub fn new(student_id: i32, present: i64, absent: i64, late: i64, excused: i64) -> Self {
        let total = present + absent + late + excused;
        let attendance_rate = if total == 0 {
            1.0
        } else {
            (present + late + excused) as f64 / total as f64
        };
        Self { student_id, present, absent, late, excused, attendance_rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_counts_absences_only() {
        let s = AttendanceSummary::new(1, 8, 2, 0, 0);
        assert!((s.attendance_rate - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_is_full_without_records() {
        let s = AttendanceSummary::new(1, 0, 0, 0, 0);
        assert_eq!(s.attendance_rate, 1.0);
    }

    #[test]
    fn late_and_excused_count_as_attended() {
        let s = AttendanceSummary::new(1, 0, 1, 2, 1);
        assert!((s.attendance_rate - 0.75).abs() < f64::EPSILON);
    }
}
