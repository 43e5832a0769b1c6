//! Home page endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct HomeResponse {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Visits of this page earlier in the session
    pub num_visits: u64,
}

/// Catalog counts and session visit counter
#[utoipa::path(
    get,
    path = "/home",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Home page data", body = HomeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn home(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<HomeResponse>> {
    let counts = state.services.catalog.counts().await?;
    let num_visits = state.services.sessions.record_visit(&claims.sid).await?;

    Ok(Json(HomeResponse {
        num_books: counts.books,
        num_instances: counts.instances,
        num_instances_available: counts.instances_available,
        num_authors: counts.authors,
        num_visits,
    }))
}
