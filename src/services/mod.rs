//! Business logic services

pub mod attendance;
pub mod auth;
pub mod books;
pub mod courses;
pub mod email;
pub mod events;
pub mod gamification;
pub mod grades;
pub mod loans;
pub mod messages;
pub mod notifications;
pub mod reservations;
pub mod settings;
pub mod stats;
pub mod students;
pub mod teachers;
pub mod users;

use crate::{
    config::{AuthConfig, EmailConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub students: students::StudentsService,
    pub teachers: teachers::TeachersService,
    pub courses: courses::CoursesService,
    pub attendance: attendance::AttendanceService,
    pub grades: grades::GradesService,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub reservations: reservations::ReservationsService,
    pub gamification: gamification::GamificationService,
    pub messages: messages::MessagesService,
    pub notifications: notifications::NotificationsService,
    pub events: events::EventsService,
    pub stats: stats::StatsService,
    pub settings: settings::SettingsService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, email_config: EmailConfig) -> Self {
        let email = email::EmailService::new(email_config);
        let notifications =
            notifications::NotificationsService::new(repository.clone(), email.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            students: students::StudentsService::new(repository.clone()),
            teachers: teachers::TeachersService::new(repository.clone()),
            courses: courses::CoursesService::new(repository.clone()),
            attendance: attendance::AttendanceService::new(repository.clone()),
            grades: grades::GradesService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), notifications.clone()),
            reservations: reservations::ReservationsService::new(repository.clone(), notifications.clone()),
            gamification: gamification::GamificationService::new(repository.clone(), notifications.clone()),
            messages: messages::MessagesService::new(repository.clone(), notifications.clone()),
            notifications,
            events: events::EventsService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            settings: settings::SettingsService::new(repository),
            email,
        }
    }
}
