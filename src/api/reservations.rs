//! Reservation (hold queue) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        loan::Loan,
        reservation::{
            CreateReservation, Reservation, ReservationDetails, ReservationQuery,
        },
    },
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// Fulfilment payload: the closed reservation and the loan that replaced it
#[derive(Serialize, ToSchema)]
pub struct FulfillResponse {
    pub reservation: Reservation,
    pub loan: Loan,
}

/// Expiry sweep payload
#[derive(Serialize, ToSchema)]
pub struct ProcessExpiredResponse {
    pub expired: i64,
}

/// Place a hold on a book
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation placed", body = ApiResponse<Reservation>),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Open reservation or active loan already exists"),
        (status = 422, description = "Copies are available; borrow instead")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reservation>>)> {
    let reservation = state.services.reservations.create(request, &claims).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Reservation placed", reservation)))
}

/// Cancel a reservation (holder or library staff)
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<Reservation>),
        (status = 403, description = "Not the holder"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is already closed")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let reservation = state.services.reservations.cancel(id, &claims).await?;
    Ok(ApiResponse::new("Reservation cancelled", reservation))
}

/// Convert a ready reservation into a loan (desk pickup)
#[utoipa::path(
    post,
    path = "/reservations/{id}/fulfill",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation fulfilled", body = ApiResponse<FulfillResponse>),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is not ready")
    )
)]
pub async fn fulfill_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<FulfillResponse>>> {
    claims.require_librarian()?;

    let (reservation, loan) = state.services.reservations.fulfill(id).await?;
    Ok(ApiResponse::new(
        "Reservation fulfilled",
        FulfillResponse { reservation, loan },
    ))
}

/// Expire overdue holds, promoting the next reader in each queue
#[utoipa::path(
    post,
    path = "/reservations/process-expired",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep finished", body = ApiResponse<ProcessExpiredResponse>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn process_expired(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<ProcessExpiredResponse>>> {
    claims.require_librarian()?;

    let expired = state.services.reservations.process_expired().await?;
    Ok(ApiResponse::new(
        "Expired reservations processed",
        ProcessExpiredResponse { expired },
    ))
}

/// Open queue for a book
#[utoipa::path(
    get,
    path = "/books/{id}/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Queue for the book", body = ApiResponse<Vec<ReservationDetails>>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<ReservationDetails>>>> {
    claims.require_librarian()?;

    let queue = state.services.reservations.for_book(id).await?;
    Ok(ApiResponse::new("Reservations", queue))
}

/// A user's reservations
#[utoipa::path(
    get,
    path = "/users/{id}/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ReservationQuery
    ),
    responses(
        (status = 200, description = "User's reservations", body = ApiResponse<Vec<ReservationDetails>>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ApiResponse<Vec<ReservationDetails>>>> {
    if claims.user_id != id {
        claims.require_librarian()?;
    }

    let (reservations, total) = state.services.reservations.for_user(id, &query).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Reservations", reservations, pagination))
}
