//! Repository layer for database operations

pub mod attendance;
pub mod books;
pub mod courses;
pub mod events;
pub mod gamification;
pub mod grades;
pub mod loans;
pub mod messages;
pub mod notifications;
pub mod reservations;
pub mod settings;
pub mod students;
pub mod teachers;
pub mod users;

use sqlx::{Pool, Postgres};
use unicode_normalization::UnicodeNormalization;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub students: students::StudentsRepository,
    pub teachers: teachers::TeachersRepository,
    pub courses: courses::CoursesRepository,
    pub attendance: attendance::AttendanceRepository,
    pub grades: grades::GradesRepository,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
    pub reservations: reservations::ReservationsRepository,
    pub gamification: gamification::GamificationRepository,
    pub messages: messages::MessagesRepository,
    pub notifications: notifications::NotificationsRepository,
    pub events: events::EventsRepository,
    pub settings: settings::SettingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            students: students::StudentsRepository::new(pool.clone()),
            teachers: teachers::TeachersRepository::new(pool.clone()),
            courses: courses::CoursesRepository::new(pool.clone()),
            attendance: attendance::AttendanceRepository::new(pool.clone()),
            grades: grades::GradesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            gamification: gamification::GamificationRepository::new(pool.clone()),
            messages: messages::MessagesRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            events: events::EventsRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Normalize a search term for ILIKE matching: NFKD fold, strip combining
/// marks, lowercase ("Élodie" matches "elodie").
pub fn normalize_search(term: &str) -> String {
    term.nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Clamp pagination inputs: page >= 1, limit in 1..=100
pub fn page_bounds(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_diacritics() {
        assert_eq!(normalize_search("Élodie"), "elodie");
        assert_eq!(normalize_search("MÜLLER"), "muller");
        assert_eq!(normalize_search("plain"), "plain");
    }

    #[test]
    fn page_bounds_clamp() {
        assert_eq!(page_bounds(None, None), (1, 20, 0));
        assert_eq!(page_bounds(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(page_bounds(Some(0), Some(500)), (1, 100, 0));
        assert_eq!(page_bounds(Some(-2), Some(0)), (1, 1, 0));
    }
}
