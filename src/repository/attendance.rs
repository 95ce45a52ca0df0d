//! Attendance repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::attendance::{
        AttendanceEntry, AttendanceQuery, AttendanceRecord, AttendanceSummary, UpdateAttendance,
    },
};

use super::page_bounds;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: Pool<Postgres>,
}

impl AttendanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a record by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<AttendanceRecord> {
        sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance record {} not found", id)))
    }

    /// Bulk upsert one course+date sheet inside a transaction.
    /// Returns the stored records for the sheet.
    pub async fn record_sheet(
        &self,
        course_id: i32,
        date: NaiveDate,
        entries: &[AttendanceEntry],
        recorded_by: i32,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO attendance (student_id, course_id, date, status, note, recorded_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (student_id, course_id, date)
                DO UPDATE SET status = EXCLUDED.status, note = EXCLUDED.note,
                              recorded_by = EXCLUDED.recorded_by, recorded_at = NOW()
                "#,
            )
            .bind(entry.student_id)
            .bind(course_id)
            .bind(date)
            .bind(entry.status.as_str())
            .bind(&entry.note)
            .bind(recorded_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE course_id = $1 AND date = $2 ORDER BY student_id",
        )
        .bind(course_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Correct a single record
    pub async fn update(&self, id: i32, data: &UpdateAttendance) -> AppResult<AttendanceRecord> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance SET status = $1, note = $2, recorded_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(data.status.as_str())
        .bind(&data.note)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attendance record {} not found", id)))
    }

    /// Query records with pagination
    pub async fn search(&self, query: &AttendanceQuery) -> AppResult<(Vec<AttendanceRecord>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let date = match query.date.as_deref() {
            Some(s) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| AppError::Validation("Invalid date (use YYYY-MM-DD)".to_string()))?,
            ),
            None => None,
        };

        let mut conditions = Vec::new();
        if let Some(id) = query.course_id {
            conditions.push(format!("course_id = {}", id));
        }
        if let Some(id) = query.student_id {
            conditions.push(format!("student_id = {}", id));
        }
        if date.is_some() {
            conditions.push("date = $1".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM attendance {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(d) = date {
            count_query = count_query.bind(d);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let next = if date.is_some() { (2, 3) } else { (1, 2) };
        let list_sql = format!(
            "SELECT * FROM attendance {} ORDER BY date DESC, student_id LIMIT ${} OFFSET ${}",
            where_clause, next.0, next.1
        );
        let mut list_query = sqlx::query_as::<_, AttendanceRecord>(&list_sql);
        if let Some(d) = date {
            list_query = list_query.bind(d);
        }
        let records = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((records, total))
    }

    /// Per-status counts for a student
    pub async fn summary(&self, student_id: i32) -> AppResult<AttendanceSummary> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'present') AS present,
                COUNT(*) FILTER (WHERE status = 'absent')  AS absent,
                COUNT(*) FILTER (WHERE status = 'late')    AS late,
                COUNT(*) FILTER (WHERE status = 'excused') AS excused
            FROM attendance
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceSummary::new(
            student_id,
            row.get("present"),
            row.get("absent"),
            row.get("late"),
            row.get("excused"),
        ))
    }
}
