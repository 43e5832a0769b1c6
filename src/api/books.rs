//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{BookDetails, BookForm},
        book_instance::{BookInstance, CreateBookInstance},
    },
    services::catalog::DeleteOutcome,
};

use super::{ActionResponse, ActionResult, AuthenticatedUser, PageQuery, PaginatedBooks, PaginatedResponse};

const BOOK_LIST: &str = "/books";

fn book_detail(id: i32) -> String {
    format!("/books/{}", id)
}

/// List books by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "List of books", body = PaginatedBooks),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedBooks>> {
    let page = query.page(&state);
    let result = state.services.catalog.list_books(page).await?;
    Ok(Json(PaginatedResponse::new(result, page)))
}

/// Get book details with genres and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a book with its genres
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = ActionResponse),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Unknown author or genre"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<BookForm>,
) -> ActionResult {
    claims.require_librarian()?;

    let book = state.services.catalog.create_book(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ActionResponse::success(format!("Book \"{}\" has been created.", book.title), book_detail(book.id))
                .with_id(book.id),
        ),
    ))
}

/// Update a book; its genres are replaced by the submitted set
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = ActionResponse),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Book, author or genre not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<BookForm>,
) -> ActionResult {
    claims.require_librarian()?;

    let book = state.services.catalog.update_book(id, form).await?;
    Ok((
        StatusCode::OK,
        Json(
            ActionResponse::success(format!("Book \"{}\" has been updated.", book.title), book_detail(book.id))
                .with_id(book.id),
        ),
    ))
}

/// Delete a book; refused while copies exist
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = ActionResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies of the book exist", body = ActionResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> ActionResult {
    claims.require_librarian()?;

    let (book, outcome) = state.services.catalog.delete_book(id).await?;

    Ok(match outcome {
        DeleteOutcome::Deleted => (
            StatusCode::OK,
            Json(ActionResponse::success(
                format!("Book \"{}\" has been deleted.", book.title),
                BOOK_LIST,
            )),
        ),
        DeleteOutcome::Blocked => (
            StatusCode::CONFLICT,
            Json(ActionResponse::error(
                format!("Book \"{}\" cannot be deleted.", book.title),
                BOOK_LIST,
            )),
        ),
    })
}

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/instances",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(data): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require_librarian()?;

    let instance = state.services.loans.create_instance(book_id, data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}
