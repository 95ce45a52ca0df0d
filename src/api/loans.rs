//! Loan circulation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery},
};

use super::{ApiResponse, AuthenticatedUser, Pagination};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = ApiResponse<Loan>),
        (status = 404, description = "Book or borrower not found"),
        (status = 409, description = "Book already on loan to this user"),
        (status = 422, description = "No copies available or loan cap reached")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<ApiResponse<Loan>>)> {
    let loan = state.services.loans.create(request, &claims).await?;
    Ok((StatusCode::CREATED, ApiResponse::new("Book borrowed", loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ApiResponse<LoanDetails>),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    claims.require_librarian()?;

    let loan = state.services.loans.return_loan(id).await?;
    Ok(ApiResponse::new("Book returned", loan))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan renewed", body = ApiResponse<Loan>),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "A reservation is pending for this book"),
        (status = 422, description = "Already returned or max renewals reached")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Loan>>> {
    let loan = state.services.loans.renew(id, &claims).await?;
    Ok(ApiResponse::new("Loan renewed", loan))
}

/// List loans (staff view)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = ApiResponse<Vec<LoanDetails>>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<ApiResponse<Vec<LoanDetails>>>> {
    claims.require_librarian()?;

    let (loans, total) = state.services.loans.search(&query).await?;
    let pagination = Pagination::new(query.page, query.limit, total);

    Ok(ApiResponse::paginated("Loans", loans, pagination))
}

/// Borrowing history for a user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans", body = ApiResponse<Vec<LoanDetails>>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<LoanDetails>>>> {
    if claims.user_id != id {
        claims.require_librarian()?;
    }

    let loans = state.services.loans.for_user(id).await?;
    Ok(ApiResponse::new("Loans", loans))
}
