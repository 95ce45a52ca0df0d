//! Teacher profile service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        course::CourseDetails,
        teacher::{Teacher, TeacherQuery, UpdateTeacher},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TeachersService {
    repository: Repository,
}

impl TeachersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search teachers with pagination
    pub async fn search(&self, query: &TeacherQuery) -> AppResult<(Vec<Teacher>, i64)> {
        self.repository.teachers.search(query).await
    }

    /// Get teacher by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Teacher> {
        self.repository.teachers.get_by_id(id).await
    }

    /// Update a teacher profile
    pub async fn update(&self, id: i32, data: UpdateTeacher) -> AppResult<Teacher> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref employee_id) = data.employee_id {
            if self.repository.teachers.employee_id_exists(employee_id, Some(id)).await? {
                return Err(AppError::Conflict("Employee ID already exists".to_string()));
            }
        }

        self.repository.teachers.update(id, &data).await
    }

    /// Courses taught by a teacher
    pub async fn courses(&self, id: i32) -> AppResult<Vec<CourseDetails>> {
        self.repository.teachers.get_by_id(id).await?;
        self.repository.teachers.courses(id).await
    }
}
