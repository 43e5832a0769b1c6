//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod health;
pub mod home;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{
        author::Author, book::BookShort, book_instance::BookInstanceListing, user::UserClaims,
    },
    repository::Page,
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Authentication("Missing or invalid authorization header".to_string())
                })?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Page selector for list endpoints
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self, state: &AppState) -> Page {
        Page::new(self.page, state.config.catalog.page_size)
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[aliases(
    PaginatedBooks = PaginatedResponse<BookShort>,
    PaginatedAuthors = PaginatedResponse<Author>,
    PaginatedBookInstances = PaginatedResponse<BookInstanceListing>
)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries of the requested page
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new((items, total): (Vec<T>, i64), page: Page) -> Self {
        Self {
            items,
            total,
            page: page.number,
            per_page: page.size,
        }
    }
}

/// Severity of the message attached to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

/// Outcome of a form submission: a message for the user and where to go next
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub level: MessageLevel,
    pub message: String,
    /// Route the client should load next
    pub redirect_to: String,
    /// Identifier of the created or updated entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ActionResponse {
    pub fn success(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            message: message.into(),
            redirect_to: redirect_to.into(),
            id: None,
        }
    }

    pub fn error(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            message: message.into(),
            redirect_to: redirect_to.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// Action response with its HTTP status
pub type ActionResult = Result<(StatusCode, Json<ActionResponse>), AppError>;
