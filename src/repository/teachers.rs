//! Teachers repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        course::CourseDetails,
        teacher::{Teacher, TeacherQuery, UpdateTeacher},
    },
};

use super::{normalize_search, page_bounds};

const TEACHER_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.employee_id, t.department, t.qualification,
           t.hire_date, u.first_name, u.last_name, u.email
    FROM teachers t
    JOIN users u ON t.user_id = u.id
"#;

#[derive(Clone)]
pub struct TeachersRepository {
    pool: Pool<Postgres>,
}

impl TeachersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get teacher by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Teacher> {
        sqlx::query_as::<_, Teacher>(&format!("{} WHERE t.id = $1", TEACHER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Teacher with id {} not found", id)))
    }

    /// Check if employee ID already exists
    pub async fn employee_id_exists(&self, employee_id: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teachers WHERE employee_id = $1 AND id != $2)")
                .bind(employee_id)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teachers WHERE employee_id = $1)")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search teachers with pagination
    pub async fn search(&self, query: &TeacherQuery) -> AppResult<(Vec<Teacher>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", normalize_search(search)));
            let n = params.len();
            conditions.push(format!(
                "(LOWER(u.first_name) LIKE ${n} OR LOWER(u.last_name) LIKE ${n} OR LOWER(t.employee_id) LIKE ${n})"
            ));
        }
        if let Some(ref department) = query.department {
            params.push(department.clone());
            conditions.push(format!("t.department = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM teachers t JOIN users u ON t.user_id = u.id {}",
            where_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "{} {} ORDER BY u.last_name, u.first_name LIMIT ${} OFFSET ${}",
            TEACHER_SELECT,
            where_clause,
            params.len() + 1,
            params.len() + 2
        );
        let mut list_query = sqlx::query_as::<_, Teacher>(&list_sql);
        for p in &params {
            list_query = list_query.bind(p);
        }
        let teachers = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((teachers, total))
    }

    /// Update a teacher profile
    pub async fn update(&self, id: i32, data: &UpdateTeacher) -> AppResult<Teacher> {
        let hire_date = match data.hire_date.as_deref() {
            Some(s) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| AppError::Validation("Invalid hire_date (use YYYY-MM-DD)".to_string()))?,
            ),
            None => None,
        };

        let mut sets = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref v) = data.employee_id { params.push(v.clone()); sets.push(format!("employee_id = ${}", params.len())); }
        if let Some(ref v) = data.department { params.push(v.clone()); sets.push(format!("department = ${}", params.len())); }
        if let Some(ref v) = data.qualification { params.push(v.clone()); sets.push(format!("qualification = ${}", params.len())); }
        if hire_date.is_some() { sets.push(format!("hire_date = ${}", params.len() + 1)); }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let sql = format!("UPDATE teachers SET {} WHERE id = {}", sets.join(", "), id);
        let mut query = sqlx::query(&sql);
        for p in &params {
            query = query.bind(p);
        }
        if let Some(d) = hire_date {
            query = query.bind(d);
        }
        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Teacher with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Courses taught by this teacher
    pub async fn courses(&self, id: i32) -> AppResult<Vec<CourseDetails>> {
        let rows = sqlx::query_as::<_, CourseDetails>(
            r#"
            SELECT c.id, c.code, c.name, c.description, c.department, c.credits,
                   c.capacity, c.teacher_id,
                   tu.first_name || ' ' || tu.last_name AS teacher_name,
                   (SELECT COUNT(*) FROM enrollments e
                     WHERE e.course_id = c.id AND e.status = 'active') AS enrolled
            FROM courses c
            LEFT JOIN teachers t ON c.teacher_id = t.id
            LEFT JOIN users tu ON t.user_id = tu.id
            WHERE c.teacher_id = $1
            ORDER BY c.code
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
