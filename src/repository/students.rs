//! Students repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        course::CourseDetails,
        student::{Parent, Student, StudentQuery, StudentShort, UpdateStudent},
    },
};

use super::{normalize_search, page_bounds};

const STUDENT_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.roll_number, s.class_level, s.section,
           s.admission_date, s.notes, u.first_name, u.last_name, u.email
    FROM students s
    JOIN users u ON s.user_id = u.id
"#;

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Student> {
        sqlx::query_as::<_, Student>(&format!("{} WHERE s.id = $1", STUDENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Get student profile by user ID
    pub async fn get_by_user_id(&self, user_id: i32) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!("{} WHERE s.user_id = $1", STUDENT_SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    /// Check if roll number already exists
    pub async fn roll_number_exists(&self, roll_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE roll_number = $1 AND id != $2)")
                .bind(roll_number)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE roll_number = $1)")
                .bind(roll_number)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search students with pagination
    pub async fn search(&self, query: &StudentQuery) -> AppResult<(Vec<StudentShort>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", normalize_search(search)));
            let n = params.len();
            conditions.push(format!(
                "(LOWER(u.first_name) LIKE ${n} OR LOWER(u.last_name) LIKE ${n} OR LOWER(s.roll_number) LIKE ${n})"
            ));
        }
        if let Some(ref class_level) = query.class_level {
            params.push(class_level.clone());
            conditions.push(format!("s.class_level = ${}", params.len()));
        }
        if let Some(ref section) = query.section {
            params.push(section.clone());
            conditions.push(format!("s.section = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM students s JOIN users u ON s.user_id = u.id {}",
            where_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            r#"
            SELECT s.id, s.user_id, s.roll_number, s.class_level, u.first_name, u.last_name
            FROM students s
            JOIN users u ON s.user_id = u.id
            {}
            ORDER BY u.last_name, u.first_name
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            params.len() + 1,
            params.len() + 2
        );
        let mut list_query = sqlx::query_as::<_, StudentShort>(&list_sql);
        for p in &params {
            list_query = list_query.bind(p);
        }
        let students = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((students, total))
    }

    /// Update a student profile
    pub async fn update(&self, id: i32, data: &UpdateStudent) -> AppResult<Student> {
        let admission_date = match data.admission_date.as_deref() {
            Some(s) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| AppError::Validation("Invalid admission_date (use YYYY-MM-DD)".to_string()))?,
            ),
            None => None,
        };

        let mut sets = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref v) = data.roll_number { params.push(v.clone()); sets.push(format!("roll_number = ${}", params.len())); }
        if let Some(ref v) = data.class_level { params.push(v.clone()); sets.push(format!("class_level = ${}", params.len())); }
        if let Some(ref v) = data.section { params.push(v.clone()); sets.push(format!("section = ${}", params.len())); }
        if let Some(ref v) = data.notes { params.push(v.clone()); sets.push(format!("notes = ${}", params.len())); }
        if admission_date.is_some() { sets.push(format!("admission_date = ${}", params.len() + 1)); }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let sql = format!("UPDATE students SET {} WHERE id = {}", sets.join(", "), id);
        let mut query = sqlx::query(&sql);
        for p in &params {
            query = query.bind(p);
        }
        if let Some(d) = admission_date {
            query = query.bind(d);
        }
        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Student with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Courses the student is actively enrolled in
    pub async fn courses(&self, id: i32) -> AppResult<Vec<CourseDetails>> {
        let rows = sqlx::query_as::<_, CourseDetails>(
            r#"
            SELECT c.id, c.code, c.name, c.description, c.department, c.credits,
                   c.capacity, c.teacher_id,
                   tu.first_name || ' ' || tu.last_name AS teacher_name,
                   (SELECT COUNT(*) FROM enrollments e2
                     WHERE e2.course_id = c.id AND e2.status = 'active') AS enrolled
            FROM enrollments e
            JOIN courses c ON e.course_id = c.id
            LEFT JOIN teachers t ON c.teacher_id = t.id
            LEFT JOIN users tu ON t.user_id = tu.id
            WHERE e.student_id = $1 AND e.status = 'active'
            ORDER BY c.code
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---- Parent links ----

    /// Whether the given parent user is linked to the student
    pub async fn is_linked_parent(&self, student_id: i32, parent_user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM parent_students ps
                JOIN parents p ON ps.parent_id = p.id
                WHERE ps.student_id = $1 AND p.user_id = $2
            )
            "#,
        )
        .bind(student_id)
        .bind(parent_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Link a parent (by user id) to a student
    pub async fn link_parent(&self, student_id: i32, parent_user_id: i32) -> AppResult<()> {
        let parent_id: Option<i32> =
            sqlx::query_scalar("SELECT id FROM parents WHERE user_id = $1")
                .bind(parent_user_id)
                .fetch_optional(&self.pool)
                .await?;
        let parent_id = parent_id
            .ok_or_else(|| AppError::NotFound("No parent profile for this user".to_string()))?;

        let result = sqlx::query(
            "INSERT INTO parent_students (parent_id, student_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(parent_id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Parent is already linked to this student".to_string()));
        }
        Ok(())
    }

    /// Parents linked to a student
    pub async fn parents(&self, student_id: i32) -> AppResult<Vec<Parent>> {
        let rows = sqlx::query_as::<_, Parent>(
            r#"
            SELECT p.id, p.user_id, p.occupation, u.first_name, u.last_name, u.email
            FROM parent_students ps
            JOIN parents p ON ps.parent_id = p.id
            JOIN users u ON p.user_id = u.id
            WHERE ps.student_id = $1
            ORDER BY u.last_name
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
