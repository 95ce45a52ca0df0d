//! Course service: CRUD, enrollments, schedule slots

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        course::{
            is_valid_course_code, Course, CourseDetails, CourseQuery, CreateCourse,
            CreateScheduleSlot, Enrollment, ScheduleQuery, ScheduleSlot, ScheduleSlotDetails,
            UpdateCourse,
        },
        student::StudentShort,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CoursesService {
    repository: Repository,
}

impl CoursesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search courses with pagination
    pub async fn search(&self, query: &CourseQuery) -> AppResult<(Vec<CourseDetails>, i64)> {
        self.repository.courses.search(query).await
    }

    /// Get course with teacher and enrollment context
    pub async fn get_details(&self, id: i32) -> AppResult<CourseDetails> {
        self.repository.courses.get_details(id).await
    }

    /// Create a course
    pub async fn create(&self, data: CreateCourse) -> AppResult<Course> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let code = data.code.to_uppercase();
        if !is_valid_course_code(&code) {
            return Err(AppError::Validation(
                "Course code must be letters followed by digits (e.g. MATH101)".to_string(),
            ));
        }
        if self.repository.courses.code_exists(&code).await? {
            return Err(AppError::Conflict("Course code already exists".to_string()));
        }

        if let Some(teacher_id) = data.teacher_id {
            self.repository.teachers.get_by_id(teacher_id).await?;
        }

        self.repository.courses.create(&data).await
    }

    /// Update a course. Capacity cannot shrink below active enrollment.
    pub async fn update(&self, id: i32, data: UpdateCourse) -> AppResult<Course> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(capacity) = data.capacity {
            let enrolled = self.repository.courses.active_enrollment_count(id).await?;
            if i64::from(capacity) < enrolled {
                return Err(AppError::Conflict(format!(
                    "{} students are enrolled; capacity cannot go below that",
                    enrolled
                )));
            }
        }

        if let Some(teacher_id) = data.teacher_id {
            self.repository.teachers.get_by_id(teacher_id).await?;
        }

        self.repository.courses.update(id, &data).await
    }

    /// Delete a course
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.courses.delete(id).await
    }

    // ---- Enrollments ----

    /// Enroll a student: duplicate and capacity guards
    pub async fn enroll(&self, course_id: i32, student_id: i32) -> AppResult<Enrollment> {
        let course = self.repository.courses.get_by_id(course_id).await?;
        self.repository.students.get_by_id(student_id).await?;

        if self.repository.courses.is_enrolled(course_id, student_id).await? {
            return Err(AppError::Conflict("Student is already enrolled in this course".to_string()));
        }

        let enrolled = self.repository.courses.active_enrollment_count(course_id).await?;
        if enrolled >= i64::from(course.capacity) {
            return Err(AppError::BusinessRule(format!(
                "Course is full ({}/{})",
                enrolled, course.capacity
            )));
        }

        self.repository.courses.enroll(course_id, student_id).await
    }

    /// Drop a student from a course
    pub async fn drop_enrollment(&self, course_id: i32, student_id: i32) -> AppResult<()> {
        self.repository.courses.get_by_id(course_id).await?;
        self.repository.courses.drop_enrollment(course_id, student_id).await
    }

    /// Active roster
    pub async fn roster(&self, course_id: i32) -> AppResult<Vec<StudentShort>> {
        self.repository.courses.get_by_id(course_id).await?;
        self.repository.courses.roster(course_id).await
    }

    // ---- Schedule ----

    /// Slots for a course
    pub async fn list_slots(&self, course_id: i32) -> AppResult<Vec<ScheduleSlot>> {
        self.repository.courses.get_by_id(course_id).await?;
        self.repository.courses.list_slots(course_id).await
    }

    /// Add a slot (overlap checks live in the repository query)
    pub async fn create_slot(&self, course_id: i32, data: CreateScheduleSlot) -> AppResult<ScheduleSlot> {
        self.repository.courses.get_by_id(course_id).await?;
        self.repository.courses.create_slot(course_id, &data).await
    }

    /// Remove a slot
    pub async fn delete_slot(&self, slot_id: i32) -> AppResult<()> {
        self.repository.courses.delete_slot(slot_id).await
    }

    /// Cross-course timetable
    pub async fn timetable(&self, query: &ScheduleQuery) -> AppResult<Vec<ScheduleSlotDetails>> {
        self.repository.courses.timetable(query).await
    }
}
