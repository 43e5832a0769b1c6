//! Book copy endpoints: loan lists and the lending form

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{LoanBookForm, LoanFormView},
};

use super::{
    ActionResponse, ActionResult, AuthenticatedUser, PageQuery, PaginatedBookInstances,
    PaginatedResponse,
};

// TODO: confirm with the circulation desk whether a loan should land on the
// borrowed list instead of the available list.
const AFTER_LOAN: &str = "/book-instances/available";

/// Copies on loan to the current user, earliest due first
#[utoipa::path(
    get,
    path = "/book-instances/mine",
    tag = "book_instances",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Borrowed copies", body = PaginatedBookInstances),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedBookInstances>> {
    let page = query.page(&state);
    let today = Utc::now().date_naive();
    let result = state
        .services
        .loans
        .loans_for(claims.user_id, page, today)
        .await?;
    Ok(Json(PaginatedResponse::new(result, page)))
}

/// Copies available for loan, by book title
#[utoipa::path(
    get,
    path = "/book-instances/available",
    tag = "book_instances",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Available copies", body = PaginatedBookInstances),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn available(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedBookInstances>> {
    let page = query.page(&state);
    let result = state.services.loans.available(page).await?;
    Ok(Json(PaginatedResponse::new(result, page)))
}

/// Initial state of the lending form
#[utoipa::path(
    get,
    path = "/book-instances/{id}/loan",
    tag = "book_instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Lending form", body = LoanFormView),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn loan_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LoanFormView>> {
    claims.require_librarian()?;

    let view = state
        .services
        .loans
        .loan_form(id, Utc::now().date_naive())
        .await?;
    Ok(Json(view))
}

/// Lend a copy to a borrower
#[utoipa::path(
    post,
    path = "/book-instances/{id}/loan",
    tag = "book_instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = LoanBookForm,
    responses(
        (status = 200, description = "Copy lent", body = ActionResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn submit_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(form): Json<LoanBookForm>,
) -> ActionResult {
    claims.require_librarian()?;

    let instance = state
        .services
        .loans
        .submit_loan(id, form, Utc::now().date_naive())
        .await?;

    let due = instance
        .due_back
        .map(|d| d.to_string())
        .unwrap_or_default();

    Ok((
        StatusCode::OK,
        Json(
            ActionResponse::success(format!("Copy lent until {}", due), AFTER_LOAN)
                .with_id(instance.id),
        ),
    ))
}
