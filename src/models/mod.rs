//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod user;

use validator::ValidationError;

// Re-export commonly used types
pub use author::{Author, AuthorDetails, AuthorForm, AuthorShort};
pub use book::{Book, BookDetails, BookForm, BookShort, GenreChanges};
pub use book_instance::{BookInstance, BookInstanceListing, LoanBookForm, LoanStatus};
pub use genre::Genre;
pub use user::{Role, User, UserClaims, UserShort};

/// Rejects values made only of whitespace; stored names are trimmed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("This field cannot be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("Dune").is_ok());
        assert!(validate_not_blank("  x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t\n ").is_err());
    }
}
