//! Courses repository: course CRUD, enrollments, schedule slots

use chrono::NaiveTime;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        course::{
            Course, CourseDetails, CourseQuery, CreateCourse, CreateScheduleSlot, Enrollment,
            ScheduleQuery, ScheduleSlot, ScheduleSlotDetails, UpdateCourse,
        },
        student::StudentShort,
    },
};

use super::{normalize_search, page_bounds};

const DETAILS_SELECT: &str = r#"
    SELECT c.id, c.code, c.name, c.description, c.department, c.credits,
           c.capacity, c.teacher_id,
           tu.first_name || ' ' || tu.last_name AS teacher_name,
           (SELECT COUNT(*) FROM enrollments e
             WHERE e.course_id = c.id AND e.status = 'active') AS enrolled
    FROM courses c
    LEFT JOIN teachers t ON c.teacher_id = t.id
    LEFT JOIN users tu ON t.user_id = tu.id
"#;

#[derive(Clone)]
pub struct CoursesRepository {
    pool: Pool<Postgres>,
}

impl CoursesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get course by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Course> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id {} not found", id)))
    }

    /// Get course with teacher and enrollment context
    pub async fn get_details(&self, id: i32) -> AppResult<CourseDetails> {
        sqlx::query_as::<_, CourseDetails>(&format!("{} WHERE c.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id {} not found", id)))
    }

    /// Check if course code already exists
    pub async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE UPPER(code) = UPPER($1))")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Search courses with pagination
    pub async fn search(&self, query: &CourseQuery) -> AppResult<(Vec<CourseDetails>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", normalize_search(search)));
            let n = params.len();
            conditions.push(format!("(LOWER(c.code) LIKE ${n} OR LOWER(c.name) LIKE ${n})"));
        }
        if let Some(ref department) = query.department {
            params.push(department.clone());
            conditions.push(format!("c.department = ${}", params.len()));
        }
        let teacher_cond = query.teacher_id.map(|id| format!("c.teacher_id = {}", id));
        if let Some(c) = teacher_cond {
            conditions.push(c);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM courses c {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "{} {} ORDER BY c.code LIMIT ${} OFFSET ${}",
            DETAILS_SELECT,
            where_clause,
            params.len() + 1,
            params.len() + 2
        );
        let mut list_query = sqlx::query_as::<_, CourseDetails>(&list_sql);
        for p in &params {
            list_query = list_query.bind(p);
        }
        let courses = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((courses, total))
    }

    /// Create a course
    pub async fn create(&self, data: &CreateCourse) -> AppResult<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (code, name, description, department, credits, capacity, teacher_id)
            VALUES (UPPER($1), $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.code)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.department)
        .bind(data.credits.unwrap_or(1))
        .bind(data.capacity.unwrap_or(30))
        .bind(data.teacher_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    /// Update a course
    pub async fn update(&self, id: i32, data: &UpdateCourse) -> AppResult<Course> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut str_params: Vec<String> = Vec::new();
        let mut idx = 0;
        let mut next = || {
            idx += 1;
            idx
        };

        if let Some(ref v) = data.name { str_params.push(v.clone()); sets.push(format!("name = ${}", next())); }
        if let Some(ref v) = data.description { str_params.push(v.clone()); sets.push(format!("description = ${}", next())); }
        if let Some(ref v) = data.department { str_params.push(v.clone()); sets.push(format!("department = ${}", next())); }
        if data.credits.is_some() { sets.push(format!("credits = ${}", next())); }
        if data.capacity.is_some() { sets.push(format!("capacity = ${}", next())); }
        if data.teacher_id.is_some() { sets.push(format!("teacher_id = ${}", next())); }

        let sql = format!("UPDATE courses SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut query = sqlx::query_as::<_, Course>(&sql);
        for p in &str_params {
            query = query.bind(p);
        }
        if let Some(v) = data.credits { query = query.bind(v); }
        if let Some(v) = data.capacity { query = query.bind(v); }
        if let Some(v) = data.teacher_id { query = query.bind(v); }

        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id {} not found", id)))
    }

    /// Delete a course (enrollments and slots cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Course with id {} not found", id)));
        }
        Ok(())
    }

    // ---- Enrollments ----

    /// Count of active enrollments
    pub async fn active_enrollment_count(&self, course_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND status = 'active'",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Whether a student has an active enrollment in a course
    pub async fn is_enrolled(&self, course_id: i32, student_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1 AND student_id = $2 AND status = 'active')",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Enroll a student. A previously dropped enrollment is reactivated.
    pub async fn enroll(&self, course_id: i32, student_id: i32) -> AppResult<Enrollment> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (student_id, course_id, status)
            VALUES ($1, $2, 'active')
            ON CONFLICT (student_id, course_id)
            DO UPDATE SET status = 'active', enrolled_at = NOW(), dropped_at = NULL
                WHERE enrollments.status = 'dropped'
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict("Student is already enrolled in this course".to_string()))?;
        Ok(enrollment)
    }

    /// Drop a student from a course (status flip, row kept)
    pub async fn drop_enrollment(&self, course_id: i32, student_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET status = 'dropped', dropped_at = NOW()
            WHERE course_id = $1 AND student_id = $2 AND status = 'active'
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("No active enrollment for this student".to_string()));
        }
        Ok(())
    }

    /// Active roster for a course
    pub async fn roster(&self, course_id: i32) -> AppResult<Vec<StudentShort>> {
        let rows = sqlx::query_as::<_, StudentShort>(
            r#"
            SELECT s.id, s.user_id, s.roll_number, s.class_level, u.first_name, u.last_name
            FROM enrollments e
            JOIN students s ON e.student_id = s.id
            JOIN users u ON s.user_id = u.id
            WHERE e.course_id = $1 AND e.status = 'active'
            ORDER BY u.last_name, u.first_name
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---- Schedule slots ----

    /// List slots for a course
    pub async fn list_slots(&self, course_id: i32) -> AppResult<Vec<ScheduleSlot>> {
        let rows = sqlx::query_as::<_, ScheduleSlot>(
            "SELECT * FROM schedule_slots WHERE course_id = $1 ORDER BY day_of_week, start_time",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a slot for a course.
    /// Rejects overlap with another slot in the same room, or with another
    /// slot of the same course, on the same day.
    pub async fn create_slot(&self, course_id: i32, data: &CreateScheduleSlot) -> AppResult<ScheduleSlot> {
        if !(0..=6).contains(&data.day_of_week) {
            return Err(AppError::Validation("day_of_week must be 0-6 (0=Monday)".to_string()));
        }
        let start = NaiveTime::parse_from_str(&data.start_time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid start_time (use HH:MM)".to_string()))?;
        let end = NaiveTime::parse_from_str(&data.end_time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid end_time (use HH:MM)".to_string()))?;
        if end <= start {
            return Err(AppError::Validation("end_time must be after start_time".to_string()));
        }

        let conflict: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM schedule_slots
                WHERE day_of_week = $1
                  AND (room = $2 OR course_id = $3)
                  AND start_time < $5 AND end_time > $4
            )
            "#,
        )
        .bind(data.day_of_week)
        .bind(&data.room)
        .bind(course_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        if conflict {
            return Err(AppError::Conflict("Slot overlaps an existing slot in this room or course".to_string()));
        }

        let slot = sqlx::query_as::<_, ScheduleSlot>(
            r#"
            INSERT INTO schedule_slots (course_id, day_of_week, start_time, end_time, room)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(course_id)
        .bind(data.day_of_week)
        .bind(start)
        .bind(end)
        .bind(&data.room)
        .fetch_one(&self.pool)
        .await?;
        Ok(slot)
    }

    /// Delete a slot
    pub async fn delete_slot(&self, slot_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM schedule_slots WHERE id = $1")
            .bind(slot_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule slot {} not found", slot_id)));
        }
        Ok(())
    }

    /// Timetable view across courses
    pub async fn timetable(&self, query: &ScheduleQuery) -> AppResult<Vec<ScheduleSlotDetails>> {
        let mut conditions = Vec::new();

        if let Some(d) = query.day_of_week {
            conditions.push(format!("ss.day_of_week = {}", d));
        }
        if let Some(id) = query.teacher_id {
            conditions.push(format!("c.teacher_id = {}", id));
        }
        if let Some(id) = query.course_id {
            conditions.push(format!("ss.course_id = {}", id));
        }
        let room_param = query.room.clone();
        if room_param.is_some() {
            conditions.push("ss.room = $1".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT ss.id, ss.course_id, ss.day_of_week, ss.start_time, ss.end_time,
                   ss.room, c.code AS course_code, c.name AS course_name
            FROM schedule_slots ss
            JOIN courses c ON ss.course_id = c.id
            {}
            ORDER BY ss.day_of_week, ss.start_time
            "#,
            where_clause
        );

        let mut q = sqlx::query_as::<_, ScheduleSlotDetails>(&sql);
        if let Some(ref room) = room_param {
            q = q.bind(room);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
