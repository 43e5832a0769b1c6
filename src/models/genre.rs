//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::validate_not_blank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Create genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGenre {
    /// Genre name, e.g. "Science Fiction". Unique regardless of case.
    #[validate(
        length(min = 1, max = 200, message = "Genre name must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
}
