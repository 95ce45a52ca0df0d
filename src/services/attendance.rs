//! Attendance service

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::attendance::{
        AttendanceQuery, AttendanceRecord, AttendanceSummary, RecordAttendance, UpdateAttendance,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AttendanceService {
    repository: Repository,
}

impl AttendanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record a sheet for one course and date. Every listed student must be
    /// actively enrolled.
    pub async fn record(&self, data: RecordAttendance, recorded_by: i32) -> AppResult<Vec<AttendanceRecord>> {
        if data.entries.is_empty() {
            return Err(AppError::Validation("At least one entry is required".to_string()));
        }

        let date = NaiveDate::parse_from_str(&data.date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation("Invalid date (use YYYY-MM-DD)".to_string()))?;

        self.repository.courses.get_by_id(data.course_id).await?;

        for entry in &data.entries {
            if !self
                .repository
                .courses
                .is_enrolled(data.course_id, entry.student_id)
                .await?
            {
                return Err(AppError::BadRequest(format!(
                    "Student {} is not enrolled in this course",
                    entry.student_id
                )));
            }
        }

        self.repository
            .attendance
            .record_sheet(data.course_id, date, &data.entries, recorded_by)
            .await
    }

    /// Correct one record
    pub async fn update(&self, id: i32, data: UpdateAttendance) -> AppResult<AttendanceRecord> {
        self.repository.attendance.update(id, &data).await
    }

    /// Query records
    pub async fn search(&self, query: &AttendanceQuery) -> AppResult<(Vec<AttendanceRecord>, i64)> {
        self.repository.attendance.search(query).await
    }

    /// Per-status summary for a student
    pub async fn summary(&self, student_id: i32) -> AppResult<AttendanceSummary> {
        self.repository.students.get_by_id(student_id).await?;
        self.repository.attendance.summary(student_id).await
    }
}
