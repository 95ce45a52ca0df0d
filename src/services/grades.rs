//! Grades service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::grade::{
        check_score_bounds, CreateGrade, Grade, Gradebook, GradeQuery, Transcript, UpdateGrade,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct GradesService {
    repository: Repository,
}

impl GradesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record a grade. The student must be enrolled in the course and the
    /// score must sit within bounds.
    pub async fn create(&self, data: CreateGrade, graded_by: i32) -> AppResult<Grade> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        check_score_bounds(data.score, data.max_score).map_err(AppError::Validation)?;

        self.repository.students.get_by_id(data.student_id).await?;
        self.repository.courses.get_by_id(data.course_id).await?;

        if !self
            .repository
            .courses
            .is_enrolled(data.course_id, data.student_id)
            .await?
        {
            return Err(AppError::BadRequest(
                "Student is not enrolled in this course".to_string(),
            ));
        }

        self.repository.grades.create(&data, graded_by).await
    }

    /// Update a grade, re-checking score bounds against the merged values
    pub async fn update(&self, id: i32, data: UpdateGrade) -> AppResult<Grade> {
        let current = self.repository.grades.get_by_id(id).await?;
        let score = data.score.unwrap_or(current.score);
        let max_score = data.max_score.unwrap_or(current.max_score);
        check_score_bounds(score, max_score).map_err(AppError::Validation)?;

        self.repository.grades.update(id, &data).await
    }

    /// Delete a grade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.grades.delete(id).await
    }

    /// Transcript for a student
    pub async fn transcript(&self, student_id: i32, query: &GradeQuery) -> AppResult<Transcript> {
        self.repository.students.get_by_id(student_id).await?;

        let grades = self.repository.grades.for_student(student_id, query).await?;
        let course_averages = self.repository.grades.course_averages(student_id).await?;

        Ok(Transcript {
            student_id,
            grades,
            course_averages,
        })
    }

    /// Gradebook for a course
    pub async fn gradebook(&self, course_id: i32, query: &GradeQuery) -> AppResult<Gradebook> {
        self.repository.courses.get_by_id(course_id).await?;

        let grades = self.repository.grades.for_course(course_id, query).await?;
        let class_average_percent = self.repository.grades.class_average(course_id).await?;

        Ok(Gradebook {
            course_id,
            grades,
            class_average_percent,
        })
    }
}
