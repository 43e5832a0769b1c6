//! Catalog management service: authors, books and genres

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        book::{Book, BookDetails, BookForm, BookShort},
        book_instance::LoanStatus,
        genre::{CreateGenre, Genre},
    },
    repository::{Page, Repository},
};

/// Result of a delete request that was allowed to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Other rows still reference the entity; nothing was removed
    Blocked,
}

impl DeleteOutcome {
    /// Map a repository delete result, keeping every error other than a
    /// referential-integrity violation
    pub fn from_result(result: AppResult<()>) -> AppResult<Self> {
        match result {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(AppError::ReferentialIntegrity(_)) => Ok(DeleteOutcome::Blocked),
            Err(e) => Err(e),
        }
    }
}

/// Catalog totals shown on the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub books: i64,
    pub instances: i64,
    pub instances_available: i64,
    pub authors: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            books: self.repository.books.count().await?,
            instances: self.repository.book_instances.count().await?,
            instances_available: self
                .repository
                .book_instances
                .count_by_status(LoanStatus::Available)
                .await?,
            authors: self.repository.authors.count().await?,
        })
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: Page) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(page).await
    }

    /// Get author with the books written by them
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.create(&form).await?;
        tracing::info!("Author created: id={} ({})", author.id, author.full_name());
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.update(id, &form).await?;
        tracing::info!("Author updated: id={}", author.id);
        Ok(author)
    }

    /// Delete an author unless books still reference them
    pub async fn delete_author(&self, id: i32) -> AppResult<(Author, DeleteOutcome)> {
        let author = self.repository.authors.get_by_id(id).await?;
        let outcome = DeleteOutcome::from_result(self.repository.authors.delete(id).await)?;

        match outcome {
            DeleteOutcome::Deleted => tracing::info!("Author deleted: id={}", id),
            DeleteOutcome::Blocked => {
                tracing::warn!("Author id={} not deleted: books reference it", id)
            }
        }
        Ok((author, outcome))
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, page: Page) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.list(page).await
    }

    /// Get book with author, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let author = self.repository.books.get_author(book.author_id).await?;
        let genres = self.repository.genres.for_book(id).await?;
        let instances = self.repository.book_instances.list_for_book(id).await?;

        Ok(BookDetails {
            book,
            author,
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        form.validate()?;
        let book = self.repository.books.create(&form).await?;
        tracing::info!("Book created: id={} isbn={}", book.id, book.isbn);
        Ok(book)
    }

    /// Update a book; its genres become exactly the submitted set
    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Book> {
        form.validate()?;
        let (book, changes) = self.repository.books.update(id, &form).await?;
        tracing::info!(
            "Book updated: id={} (genres +{} -{})",
            book.id,
            changes.to_add.len(),
            changes.to_remove.len()
        );
        Ok(book)
    }

    /// Delete a book unless copies of it exist
    pub async fn delete_book(&self, id: i32) -> AppResult<(Book, DeleteOutcome)> {
        let book = self.repository.books.get_by_id(id).await?;
        let outcome = DeleteOutcome::from_result(self.repository.books.delete(id).await)?;

        match outcome {
            DeleteOutcome::Deleted => tracing::info!("Book deleted: id={}", id),
            DeleteOutcome::Blocked => {
                tracing::warn!("Book id={} not deleted: instances exist", id)
            }
        }
        Ok((book, outcome))
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, data: CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres.create(&data.name).await?;
        tracing::info!("Genre created: id={} ({})", genre.id, genre.name);
        Ok(genre)
    }
}
