//! Grades repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::grade::{CourseAverage, CreateGrade, Grade, GradeQuery, UpdateGrade},
};

#[derive(Clone)]
pub struct GradesRepository {
    pool: Pool<Postgres>,
}

impl GradesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get grade by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Grade> {
        sqlx::query_as::<_, Grade>("SELECT * FROM grades WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grade with id {} not found", id)))
    }

    /// Insert a grade
    pub async fn create(&self, data: &CreateGrade, graded_by: i32) -> AppResult<Grade> {
        let grade = sqlx::query_as::<_, Grade>(
            r#"
            INSERT INTO grades (student_id, course_id, assessment, title, score, max_score, term, comment, graded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.student_id)
        .bind(data.course_id)
        .bind(data.assessment.as_str())
        .bind(&data.title)
        .bind(data.score)
        .bind(data.max_score)
        .bind(&data.term)
        .bind(&data.comment)
        .bind(graded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(grade)
    }

    /// Update a grade
    pub async fn update(&self, id: i32, data: &UpdateGrade) -> AppResult<Grade> {
        let current = self.get_by_id(id).await?;

        let grade = sqlx::query_as::<_, Grade>(
            r#"
            UPDATE grades
            SET title = $1, score = $2, max_score = $3, comment = $4, graded_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.title.as_ref().unwrap_or(&current.title))
        .bind(data.score.unwrap_or(current.score))
        .bind(data.max_score.unwrap_or(current.max_score))
        .bind(data.comment.as_ref().or(current.comment.as_ref()))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(grade)
    }

    /// Delete a grade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Grade with id {} not found", id)));
        }
        Ok(())
    }

    /// All grades for a student, optionally filtered by term/course
    pub async fn for_student(&self, student_id: i32, query: &GradeQuery) -> AppResult<Vec<Grade>> {
        let mut conditions = vec!["student_id = $1".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(ref term) = query.term {
            params.push(term.clone());
            conditions.push(format!("term = ${}", params.len() + 1));
        }
        if let Some(course_id) = query.course_id {
            conditions.push(format!("course_id = {}", course_id));
        }
        if let Some(assessment) = query.assessment {
            params.push(assessment.as_str().to_string());
            conditions.push(format!("assessment = ${}", params.len() + 1));
        }

        let sql = format!(
            "SELECT * FROM grades WHERE {} ORDER BY graded_at DESC",
            conditions.join(" AND ")
        );
        let mut q = sqlx::query_as::<_, Grade>(&sql).bind(student_id);
        for p in &params {
            q = q.bind(p);
        }
        let grades = q.fetch_all(&self.pool).await?;
        Ok(grades)
    }

    /// All grades for a course, optionally filtered by term/assessment
    pub async fn for_course(&self, course_id: i32, query: &GradeQuery) -> AppResult<Vec<Grade>> {
        let mut conditions = vec!["course_id = $1".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(ref term) = query.term {
            params.push(term.clone());
            conditions.push(format!("term = ${}", params.len() + 1));
        }
        if let Some(assessment) = query.assessment {
            params.push(assessment.as_str().to_string());
            conditions.push(format!("assessment = ${}", params.len() + 1));
        }

        let sql = format!(
            "SELECT * FROM grades WHERE {} ORDER BY student_id, graded_at DESC",
            conditions.join(" AND ")
        );
        let mut q = sqlx::query_as::<_, Grade>(&sql).bind(course_id);
        for p in &params {
            q = q.bind(p);
        }
        let grades = q.fetch_all(&self.pool).await?;
        Ok(grades)
    }

    /// Per-course averages for a student's transcript
    pub async fn course_averages(&self, student_id: i32) -> AppResult<Vec<CourseAverage>> {
        let rows = sqlx::query_as::<_, CourseAverage>(
            r#"
            SELECT g.course_id, c.code AS course_code, c.name AS course_name,
                   AVG(g.score / g.max_score) * 100.0 AS average_percent,
                   COUNT(*) AS grade_count
            FROM grades g
            JOIN courses c ON g.course_id = c.id
            WHERE g.student_id = $1
            GROUP BY g.course_id, c.code, c.name
            ORDER BY c.code
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Class average over a course's grades (None with no grades)
    pub async fn class_average(&self, course_id: i32) -> AppResult<Option<f64>> {
        let avg: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(score / max_score) * 100.0 FROM grades WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(avg)
    }
}
