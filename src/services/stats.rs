//! Statistics service for the admin dashboard

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::Row;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Dashboard counters
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub users: UserStats,
    pub courses: CourseStats,
    pub library: LibraryStats,
    /// Share of today's attendance records that are not absences
    pub attendance_rate_today: Option<f64>,
    /// Events starting within the next 7 days
    pub upcoming_events: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total: i64,
    pub students: i64,
    pub teachers: i64,
    pub parents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseStats {
    pub total: i64,
    pub active_enrollments: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LibraryStats {
    pub books: i64,
    pub copies: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub open_reservations: i64,
}

/// One day in the attendance time series
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceDay {
    pub date: NaiveDate,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Database handle for readiness probes
    pub fn pool(&self) -> sqlx::Pool<sqlx::Postgres> {
        self.repository.pool.clone()
    }

    /// Dashboard counters
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;

        let user_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE role = 'student') AS students,
                   COUNT(*) FILTER (WHERE role = 'teacher') AS teachers,
                   COUNT(*) FILTER (WHERE role = 'parent')  AS parents
            FROM users
            "#,
        )
        .fetch_one(pool)
        .await?;

        let courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(pool)
            .await?;
        let active_enrollments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE status = 'active'")
                .fetch_one(pool)
                .await?;

        let book_row = sqlx::query(
            "SELECT COUNT(*) AS books, COALESCE(SUM(total_copies), 0) AS copies FROM books",
        )
        .fetch_one(pool)
        .await?;

        let active_loans = self.repository.loans.count_active().await?;
        let overdue_loans = self.repository.loans.count_overdue().await?;
        let open_reservations = self.repository.reservations.count_open().await?;

        let attendance_rate_today: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG(CASE WHEN status = 'absent' THEN 0.0 ELSE 1.0 END)::float8
            FROM attendance
            WHERE date = CURRENT_DATE
            "#,
        )
        .fetch_one(pool)
        .await?;

        let upcoming_events = self.repository.events.count_upcoming(7).await?;

        Ok(StatsResponse {
            users: UserStats {
                total: user_row.get("total"),
                students: user_row.get("students"),
                teachers: user_row.get("teachers"),
                parents: user_row.get("parents"),
            },
            courses: CourseStats {
                total: courses,
                active_enrollments,
            },
            library: LibraryStats {
                books: book_row.get("books"),
                copies: book_row.get("copies"),
                active_loans,
                overdue_loans,
                open_reservations,
            },
            attendance_rate_today,
            upcoming_events,
        })
    }

    /// Daily attendance counts over a date range (inclusive)
    pub async fn attendance_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceDay>> {
        let rows = sqlx::query(
            r#"
            SELECT date,
                   COUNT(*) FILTER (WHERE status = 'present') AS present,
                   COUNT(*) FILTER (WHERE status = 'absent')  AS absent,
                   COUNT(*) FILTER (WHERE status = 'late')    AS late,
                   COUNT(*) FILTER (WHERE status = 'excused') AS excused
            FROM attendance
            WHERE date >= $1 AND date <= $2
            GROUP BY date
            ORDER BY date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AttendanceDay {
                date: row.get("date"),
                present: row.get("present"),
                absent: row.get("absent"),
                late: row.get("late"),
                excused: row.get("excused"),
            })
            .collect())
    }
}
