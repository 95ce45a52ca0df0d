//! Ardesia Server - School Management System
//!
//! A Rust REST API server for school administration.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ardesia_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ardesia_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ardesia Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.email.clone());

    // Provision the bootstrap admin on first start
    services
        .auth
        .ensure_bootstrap_admin()
        .await
        .expect("Failed to provision bootstrap admin");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rate limit for credential endpoints
    let governor_config = Box::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .finish()
            .expect("Invalid rate limiter configuration"),
    );

    // Authentication (login/register/refresh are rate-limited)
    let auth_routes = Router::new()
        .route("/auth/login", post(api::auth::login))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/refresh", post(api::auth::refresh))
        .layer(GovernorLayer {
            config: Box::leak(governor_config),
        });

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .merge(auth_routes)
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users", post(api::users::create_user))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id", put(api::users::update_user))
        .route("/users/:id", delete(api::users::delete_user))
        .route("/users/:id/status", put(api::users::update_user_status))
        .route("/users/:id/loans", get(api::loans::user_loans))
        .route("/users/:id/reservations", get(api::reservations::user_reservations))
        .route("/users/:id/points", get(api::gamification::user_points))
        .route("/users/:id/badges", get(api::gamification::user_badges))
        .route("/users/:id/badges/:badge_id", post(api::gamification::award_badge))
        // Students
        .route("/students", get(api::students::list_students))
        .route("/students/me", get(api::students::my_profile))
        .route("/students/:id", get(api::students::get_student))
        .route("/students/:id", put(api::students::update_student))
        .route("/students/:id/courses", get(api::students::student_courses))
        .route("/students/:id/parents", get(api::students::student_parents))
        .route("/students/:id/parents", post(api::students::link_parent))
        .route("/students/:id/grades", get(api::grades::student_grades))
        .route("/students/:id/attendance/summary", get(api::attendance::attendance_summary))
        // Teachers
        .route("/teachers", get(api::teachers::list_teachers))
        .route("/teachers/:id", get(api::teachers::get_teacher))
        .route("/teachers/:id", put(api::teachers::update_teacher))
        .route("/teachers/:id/courses", get(api::teachers::teacher_courses))
        // Courses
        .route("/courses", get(api::courses::list_courses))
        .route("/courses", post(api::courses::create_course))
        .route("/courses/:id", get(api::courses::get_course))
        .route("/courses/:id", put(api::courses::update_course))
        .route("/courses/:id", delete(api::courses::delete_course))
        .route("/courses/:id/enrollments", get(api::courses::course_roster))
        .route("/courses/:id/enrollments", post(api::courses::enroll_student))
        .route("/courses/:id/enrollments/:student_id", delete(api::courses::drop_enrollment))
        .route("/courses/:id/schedule", get(api::courses::course_schedule))
        .route("/courses/:id/schedule", post(api::courses::create_schedule_slot))
        .route("/courses/:id/grades", get(api::grades::course_grades))
        // Schedule
        .route("/schedule", get(api::courses::timetable))
        .route("/schedule/:slot_id", delete(api::courses::delete_schedule_slot))
        // Attendance
        .route("/attendance", get(api::attendance::list_attendance))
        .route("/attendance", post(api::attendance::record_attendance))
        .route("/attendance/:id", put(api::attendance::update_attendance))
        // Grades
        .route("/grades", post(api::grades::create_grade))
        .route("/grades/:id", put(api::grades::update_grade))
        .route("/grades/:id", delete(api::grades::delete_grade))
        // Books
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/reservations", get(api::reservations::book_reservations))
        // Loans
        .route("/loans", get(api::loans::list_loans))
        .route("/loans", post(api::loans::create_loan))
        .route("/loans/:id/return", post(api::loans::return_loan))
        .route("/loans/:id/renew", post(api::loans::renew_loan))
        // Reservations
        .route("/reservations", post(api::reservations::create_reservation))
        .route("/reservations/:id", delete(api::reservations::cancel_reservation))
        .route("/reservations/:id/fulfill", post(api::reservations::fulfill_reservation))
        .route("/reservations/process-expired", post(api::reservations::process_expired))
        // Gamification
        .route("/gamification/points", post(api::gamification::award_points))
        .route("/gamification/leaderboard", get(api::gamification::leaderboard))
        .route("/badges", get(api::gamification::list_badges))
        .route("/badges", post(api::gamification::create_badge))
        .route("/quizzes", get(api::gamification::list_quizzes))
        .route("/quizzes", post(api::gamification::create_quiz))
        .route("/quizzes/:id", get(api::gamification::get_quiz))
        .route("/quizzes/:id/submit", post(api::gamification::submit_quiz))
        // Messages
        .route("/conversations", get(api::messages::list_conversations))
        .route("/conversations", post(api::messages::create_conversation))
        .route("/conversations/:id/messages", get(api::messages::list_messages))
        .route("/conversations/:id/messages", post(api::messages::send_message))
        .route("/conversations/:id/read", post(api::messages::mark_conversation_read))
        // Notifications
        .route("/notifications", get(api::notifications::list_notifications))
        .route("/notifications", post(api::notifications::broadcast))
        .route("/notifications/unread-count", get(api::notifications::unread_count))
        .route("/notifications/read-all", post(api::notifications::mark_all_read))
        .route("/notifications/:id/read", post(api::notifications::mark_read))
        // Events
        .route("/events", get(api::events::list_events))
        .route("/events", post(api::events::create_event))
        .route("/events/:id", get(api::events::get_event))
        .route("/events/:id", put(api::events::update_event))
        .route("/events/:id", delete(api::events::delete_event))
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .route("/stats/attendance", get(api::stats::attendance_series))
        // Settings
        .route("/settings", get(api::settings::get_settings))
        .route("/settings", put(api::settings::update_settings))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
