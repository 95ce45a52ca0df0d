//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    attendance, auth, books, courses, events, gamification, grades, health, loans, messages,
    notifications, reservations, settings, stats, students, teachers, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ardesia API",
        version = "1.0.0",
        description = "School Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Ardesia Team", email = "dev@ardesia.school")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::refresh,
        auth::logout,
        auth::me,
        auth::update_profile,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::update_user_status,
        users::delete_user,
        // Students
        students::list_students,
        students::my_profile,
        students::get_student,
        students::update_student,
        students::student_courses,
        students::student_parents,
        students::link_parent,
        // Teachers
        teachers::list_teachers,
        teachers::get_teacher,
        teachers::update_teacher,
        teachers::teacher_courses,
        // Courses
        courses::list_courses,
        courses::get_course,
        courses::create_course,
        courses::update_course,
        courses::delete_course,
        courses::enroll_student,
        courses::drop_enrollment,
        courses::course_roster,
        courses::course_schedule,
        courses::create_schedule_slot,
        courses::delete_schedule_slot,
        courses::timetable,
        // Attendance
        attendance::record_attendance,
        attendance::update_attendance,
        attendance::list_attendance,
        attendance::attendance_summary,
        // Grades
        grades::create_grade,
        grades::update_grade,
        grades::delete_grade,
        grades::student_grades,
        grades::course_grades,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::renew_loan,
        loans::list_loans,
        loans::user_loans,
        // Reservations
        reservations::create_reservation,
        reservations::cancel_reservation,
        reservations::fulfill_reservation,
        reservations::process_expired,
        reservations::book_reservations,
        reservations::user_reservations,
        // Gamification
        gamification::award_points,
        gamification::user_points,
        gamification::leaderboard,
        gamification::list_badges,
        gamification::create_badge,
        gamification::award_badge,
        gamification::user_badges,
        gamification::create_quiz,
        gamification::list_quizzes,
        gamification::get_quiz,
        gamification::submit_quiz,
        // Messages
        messages::create_conversation,
        messages::list_conversations,
        messages::list_messages,
        messages::send_message,
        messages::mark_conversation_read,
        // Notifications
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::broadcast,
        // Events
        events::list_events,
        events::get_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        // Stats
        stats::get_stats,
        stats::attendance_series,
        // Settings
        settings::get_settings,
        settings::update_settings,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::TokenResponse,
            auth::UserInfo,
            auth::RefreshRequest,
            crate::services::auth::RegisterRequest,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::Role,
            crate::models::user::UserStatus,
            crate::models::user::RoleProfile,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateProfile,
            crate::models::user::UpdateUserStatus,
            // Students
            crate::models::student::Student,
            crate::models::student::StudentShort,
            crate::models::student::UpdateStudent,
            crate::models::student::LinkParent,
            crate::models::student::Parent,
            // Teachers
            crate::models::teacher::Teacher,
            crate::models::teacher::UpdateTeacher,
            // Courses
            crate::models::course::Course,
            crate::models::course::CourseDetails,
            crate::models::course::CreateCourse,
            crate::models::course::UpdateCourse,
            crate::models::course::Enrollment,
            crate::models::course::EnrollStudent,
            crate::models::course::ScheduleSlot,
            crate::models::course::ScheduleSlotDetails,
            crate::models::course::CreateScheduleSlot,
            // Attendance
            crate::models::attendance::AttendanceStatus,
            crate::models::attendance::AttendanceRecord,
            crate::models::attendance::AttendanceEntry,
            crate::models::attendance::RecordAttendance,
            crate::models::attendance::UpdateAttendance,
            crate::models::attendance::AttendanceSummary,
            // Grades
            crate::models::grade::Assessment,
            crate::models::grade::Grade,
            crate::models::grade::CreateGrade,
            crate::models::grade::UpdateGrade,
            crate::models::grade::CourseAverage,
            crate::models::grade::Transcript,
            crate::models::grade::Gradebook,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Loans
            crate::models::loan::LoanStatus,
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            // Reservations
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservation,
            reservations::FulfillResponse,
            reservations::ProcessExpiredResponse,
            // Gamification
            crate::models::gamification::PointAward,
            crate::models::gamification::AwardPoints,
            crate::models::gamification::PointsSummary,
            crate::models::gamification::LeaderboardEntry,
            crate::models::gamification::Badge,
            crate::models::gamification::CreateBadge,
            crate::models::gamification::UserBadge,
            crate::models::gamification::Quiz,
            crate::models::gamification::QuizQuestion,
            crate::models::gamification::QuizQuestionPublic,
            crate::models::gamification::CreateQuiz,
            crate::models::gamification::CreateQuizQuestion,
            crate::models::gamification::SubmitQuiz,
            crate::models::gamification::QuizAttempt,
            gamification::QuizResponse,
            // Messages
            crate::models::message::Conversation,
            crate::models::message::ConversationSummary,
            crate::models::message::Message,
            crate::models::message::CreateConversation,
            crate::models::message::SendMessage,
            // Notifications
            crate::models::notification::NotificationKind,
            crate::models::notification::Notification,
            crate::models::notification::BroadcastNotification,
            crate::models::notification::UnreadCount,
            notifications::BroadcastResponse,
            // Events
            crate::models::event::Audience,
            crate::models::event::Event,
            crate::models::event::CreateEvent,
            crate::models::event::UpdateEvent,
            // Stats
            crate::services::stats::StatsResponse,
            crate::services::stats::UserStats,
            crate::services::stats::CourseStats,
            crate::services::stats::LibraryStats,
            crate::services::stats::AttendanceDay,
            // Settings
            crate::models::setting::Settings,
            crate::models::setting::SchoolSettings,
            crate::models::setting::CirculationSettings,
            crate::models::setting::UpdateSettings,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "students", description = "Student records"),
        (name = "teachers", description = "Teacher records"),
        (name = "courses", description = "Courses and enrollments"),
        (name = "schedule", description = "Course scheduling"),
        (name = "attendance", description = "Attendance tracking"),
        (name = "grades", description = "Grading"),
        (name = "books", description = "Library catalog"),
        (name = "loans", description = "Library circulation"),
        (name = "reservations", description = "Library hold queue"),
        (name = "gamification", description = "Points, badges and quizzes"),
        (name = "messages", description = "Messaging"),
        (name = "notifications", description = "Notifications"),
        (name = "events", description = "School calendar"),
        (name = "stats", description = "Statistics"),
        (name = "settings", description = "System settings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
