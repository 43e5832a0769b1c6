//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{AuthorDetails, AuthorForm},
    services::catalog::DeleteOutcome,
};

use super::{ActionResponse, ActionResult, AuthenticatedUser, PageQuery, PaginatedAuthors, PaginatedResponse};

const AUTHOR_LIST: &str = "/authors";

/// List authors by last name, then first name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "List of authors", body = PaginatedAuthors),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedAuthors>> {
    let page = query.page(&state);
    let result = state.services.catalog.list_authors(page).await?;
    Ok(Json(PaginatedResponse::new(result, page)))
}

/// Get author details with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = ActionResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<AuthorForm>,
) -> ActionResult {
    claims.require_librarian()?;

    let author = state.services.catalog.create_author(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ActionResponse::success(format!("{} has been created", author.full_name()), AUTHOR_LIST)
                .with_id(author.id),
        ),
    ))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = ActionResponse),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<AuthorForm>,
) -> ActionResult {
    claims.require_librarian()?;

    let author = state.services.catalog.update_author(id, form).await?;
    Ok((
        StatusCode::OK,
        Json(
            ActionResponse::success(format!("{} has been updated", author.full_name()), AUTHOR_LIST)
                .with_id(author.id),
        ),
    ))
}

/// Delete an author; refused while books reference them
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author deleted", body = ActionResponse),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Books exist for this author", body = ActionResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> ActionResult {
    claims.require_librarian()?;

    let (author, outcome) = state.services.catalog.delete_author(id).await?;
    let name = author.full_name();

    Ok(match outcome {
        DeleteOutcome::Deleted => (
            StatusCode::OK,
            Json(ActionResponse::success(format!("{} has been deleted", name), AUTHOR_LIST)),
        ),
        DeleteOutcome::Blocked => (
            StatusCode::CONFLICT,
            Json(ActionResponse::error(
                format!("{} cannot be deleted. Books exist for this author", name),
                AUTHOR_LIST,
            )),
        ),
    })
}
