//! Books repository for database operations.
//!
//! A book row and its genre links are always written in the same transaction,
//! so a failed genre lookup or link insert leaves the previous state intact.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorShort,
        book::{Book, BookForm, BookShort, GenreChanges},
    },
};

use super::{genres::GenresRepository, Page};

const BOOK_COLUMNS: &str = "id, title, author_id, summary, isbn, language, cover_image";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// List books ordered by title
    pub async fn list(&self, page: Page) -> AppResult<(Vec<BookShort>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.author_id,
                   a.first_name || ' ' || a.last_name AS author_name,
                   b.language
            FROM books b
            JOIN authors a ON a.id = b.author_id
            ORDER BY b.title, b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Books written by an author, by title
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.author_id,
                   a.first_name || ' ' || a.last_name AS author_name,
                   b.language
            FROM books b
            JOIN authors a ON a.id = b.author_id
            WHERE b.author_id = $1
            ORDER BY b.title, b.id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn get_author(&self, author_id: i32) -> AppResult<AuthorShort> {
        sqlx::query_as::<_, AuthorShort>(
            "SELECT id, first_name, last_name FROM authors WHERE id = $1",
        )
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", author_id)))
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a book with its genres in one transaction
    pub async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let genre_ids = GenresRepository::resolve_names(&mut tx, &form.genre_keys()).await?;
        ensure_author(&mut tx, form.author_id).await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(form.title.trim())
        .bind(form.author_id)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.normalized_language())
        .bind(&form.cover_image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| isbn_conflict(e, &form.isbn))?;

        let changes = GenreChanges {
            to_remove: Vec::new(),
            to_add: genre_ids.into_iter().collect(),
        };
        apply_genre_changes(&mut tx, book.id, &changes).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Update a book and replace its genre set in one transaction
    pub async fn update(&self, id: i32, form: &BookForm) -> AppResult<(Book, GenreChanges)> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let submitted = GenresRepository::resolve_names(&mut tx, &form.genre_keys()).await?;
        ensure_author(&mut tx, form.author_id).await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4,
                language = $5, cover_image = $6
            WHERE id = $7
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(form.title.trim())
        .bind(form.author_id)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.normalized_language())
        .bind(&form.cover_image)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| isbn_conflict(e, &form.isbn))?;

        let current = GenresRepository::ids_for_book(&mut tx, id).await?;
        let changes = GenreChanges::between(&current, &submitted);
        if !changes.is_empty() {
            apply_genre_changes(&mut tx, id, &changes).await?;
        }

        tx.commit().await?;
        Ok((book, changes))
    }

    /// Delete a book.
    ///
    /// Fails with `ReferentialIntegrity` while instances of the book exist.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, format!("Instances exist for book {}", id)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}

async fn ensure_author(conn: &mut PgConnection, author_id: i32) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
        .bind(author_id)
        .fetch_one(&mut *conn)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Author with id {} not found", author_id)))
    }
}

async fn apply_genre_changes(
    conn: &mut PgConnection,
    book_id: i32,
    changes: &GenreChanges,
) -> AppResult<()> {
    if !changes.to_remove.is_empty() {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1 AND genre_id = ANY($2)")
            .bind(book_id)
            .bind(&changes.to_remove)
            .execute(&mut *conn)
            .await?;
    }

    if !changes.to_add.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO book_genres (book_id, genre_id)
            SELECT $1, UNNEST($2::int[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(&changes.to_add)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn isbn_conflict(err: sqlx::Error, isbn: &str) -> AppError {
    AppError::from_constraint(err, format!("A book with ISBN {} already exists", isbn))
}
