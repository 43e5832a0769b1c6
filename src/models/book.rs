//! Book (catalog title) model and related types

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{author::AuthorShort, book_instance::BookInstance, genre::Genre, validate_not_blank};

static ISBN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{13}|\d{9}[\dX])$").expect("ISBN pattern is valid")
});

/// Book row as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    /// Free-text language, e.g. "English"
    pub language: Option<String>,
    pub cover_image: Option<String>,
}

/// Book line in paginated lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub author_name: String,
    pub language: Option<String>,
}

/// Book with author, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: AuthorShort,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

/// Create/update book form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(range(min = 1, message = "Author is required"))]
    pub author_id: i32,
    #[validate(
        length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub summary: String,
    /// 13 digit ISBN (10 digit ISBNs are accepted too)
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    /// Genre names; the stored set is replaced by exactly these
    #[serde(default)]
    pub genres: Vec<String>,
    #[validate(length(max = 100, message = "Language is limited to 100 characters"))]
    pub language: Option<String>,
    #[validate(length(max = 255, message = "Image path is limited to 255 characters"))]
    pub cover_image: Option<String>,
}

impl BookForm {
    /// Submitted genre names, trimmed and deduplicated case-insensitively
    pub fn genre_keys(&self) -> BTreeSet<String> {
        self.genres
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Blank language is stored as NULL
    pub fn normalized_language(&self) -> Option<String> {
        self.language
            .as_ref()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if ISBN_RE.is_match(isbn) {
        Ok(())
    } else {
        let mut err = ValidationError::new("isbn");
        err.message = Some("ISBN must be 13 digits (or 10 with optional X check digit)".into());
        Err(err)
    }
}

/// Link rows to delete and insert so that a book's genres become `submitted`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreChanges {
    pub to_remove: Vec<i32>,
    pub to_add: Vec<i32>,
}

impl GenreChanges {
    pub fn between(current: &BTreeSet<i32>, submitted: &BTreeSet<i32>) -> Self {
        Self {
            to_remove: current.difference(submitted).copied().collect(),
            to_add: submitted.difference(current).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn form() -> BookForm {
        BookForm {
            title: "The Dispossessed".to_string(),
            author_id: 1,
            summary: "An ambiguous utopia.".to_string(),
            isbn: "9780060512750".to_string(),
            genres: vec!["Fiction".to_string(), "Science Fiction".to_string()],
            language: Some("English".to_string()),
            cover_image: None,
        }
    }

    fn set(ids: &[i32]) -> BTreeSet<i32> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_valid_form() {
        assert_ok!(form().validate());
    }

    #[test]
    fn test_whitespace_title_rejected() {
        let mut f = form();
        f.title = "   ".to_string();
        let errors = f.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_isbn_format() {
        assert_ok!(validate_isbn("9780060512750"));
        assert_ok!(validate_isbn("006051275X"));
        assert_err!(validate_isbn("978-0060512750"));
        assert_err!(validate_isbn("12345"));
    }

    #[test]
    fn test_missing_author_rejected() {
        let mut f = form();
        f.author_id = 0;
        let errors = f.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("author_id"));
    }

    #[test]
    fn test_language_too_long() {
        let mut f = form();
        f.language = Some("x".repeat(101));
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_genre_keys_dedupe() {
        let mut f = form();
        f.genres = vec![
            " Drama".to_string(),
            "drama".to_string(),
            "".to_string(),
            "Horror".to_string(),
        ];
        let keys: Vec<_> = f.genre_keys().into_iter().collect();
        assert_eq!(keys, vec!["drama".to_string(), "horror".to_string()]);
    }

    #[test]
    fn test_blank_language_is_none() {
        let mut f = form();
        f.language = Some("   ".to_string());
        assert_eq!(f.normalized_language(), None);
        f.language = Some(" Farsi ".to_string());
        assert_eq!(f.normalized_language(), Some("Farsi".to_string()));
    }

    #[test]
    fn test_genre_changes_replace() {
        // {Fiction=1, Drama=2} -> {Drama=2, Horror=3}
        let changes = GenreChanges::between(&set(&[1, 2]), &set(&[2, 3]));
        assert_eq!(changes.to_remove, vec![1]);
        assert_eq!(changes.to_add, vec![3]);
    }

    #[test]
    fn test_genre_changes_clear_all() {
        let changes = GenreChanges::between(&set(&[4, 5]), &set(&[]));
        assert_eq!(changes.to_remove, vec![4, 5]);
        assert!(changes.to_add.is_empty());
    }

    #[test]
    fn test_genre_changes_unchanged() {
        assert!(GenreChanges::between(&set(&[1, 2]), &set(&[2, 1])).is_empty());
    }
}
