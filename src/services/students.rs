//! Student profile service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        course::CourseDetails,
        student::{can_read_student, LinkParent, Parent, Student, StudentQuery, StudentShort, UpdateStudent},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct StudentsService {
    repository: Repository,
}

impl StudentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search students with pagination (staff only, enforced at the route)
    pub async fn search(&self, query: &StudentQuery) -> AppResult<(Vec<StudentShort>, i64)> {
        self.repository.students.search(query).await
    }

    /// Get a student, enforcing own-record access for students and linked
    /// parents.
    pub async fn get_checked(&self, id: i32, claims: &UserClaims) -> AppResult<Student> {
        let student = self.repository.students.get_by_id(id).await?;

        let is_linked = self
            .repository
            .students
            .is_linked_parent(id, claims.user_id)
            .await?;

        if !can_read_student(claims.role, claims.user_id, student.user_id, is_linked) {
            return Err(AppError::Authorization("Access to this record is not allowed".to_string()));
        }

        Ok(student)
    }

    /// Resolve the student profile of the authenticated user
    pub async fn for_claims(&self, claims: &UserClaims) -> AppResult<Student> {
        self.repository
            .students
            .get_by_user_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No student profile for this account".to_string()))
    }

    /// Update a student profile (staff)
    pub async fn update(&self, id: i32, data: UpdateStudent) -> AppResult<Student> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref roll_number) = data.roll_number {
            if self.repository.students.roll_number_exists(roll_number, Some(id)).await? {
                return Err(AppError::Conflict("Roll number already exists".to_string()));
            }
        }

        self.repository.students.update(id, &data).await
    }

    /// Active enrollments for a student
    pub async fn courses(&self, id: i32, claims: &UserClaims) -> AppResult<Vec<CourseDetails>> {
        self.get_checked(id, claims).await?;
        self.repository.students.courses(id).await
    }

    /// Link a parent account to a student
    pub async fn link_parent(&self, id: i32, data: LinkParent) -> AppResult<()> {
        self.repository.students.get_by_id(id).await?;
        self.repository.students.link_parent(id, data.parent_user_id).await
    }

    /// Parents linked to a student
    pub async fn parents(&self, id: i32, claims: &UserClaims) -> AppResult<Vec<Parent>> {
        self.get_checked(id, claims).await?;
        self.repository.students.parents(id).await
    }
}
