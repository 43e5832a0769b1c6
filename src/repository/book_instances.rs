//! Book instances repository

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        check_loan, BookInstance, BookInstanceListing, CreateBookInstance, LoanStatus,
    },
};

use super::Page;

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book instance by ID along with its book title
    pub async fn get_listing(&self, id: Uuid) -> AppResult<BookInstanceListing> {
        sqlx::query_as::<_, BookInstanceListing>(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.borrower_id, bi.status
            FROM book_instances bi
            JOIN books b ON b.id = bi.book_id
            WHERE bi.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Copies of a book, earliest due first
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let instances = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT id, book_id, imprint, due_back, borrower_id, status
            FROM book_instances
            WHERE book_id = $1
            ORDER BY due_back NULLS LAST, imprint
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(instances)
    }

    /// Copies on loan to a borrower, earliest due first
    pub async fn list_on_loan_to(
        &self,
        borrower_id: i32,
        page: Page,
    ) -> AppResult<(Vec<BookInstanceListing>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE borrower_id = $1 AND status = $2",
        )
        .bind(borrower_id)
        .bind(LoanStatus::OnLoan)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, BookInstanceListing>(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.borrower_id, bi.status
            FROM book_instances bi
            JOIN books b ON b.id = bi.book_id
            WHERE bi.borrower_id = $1 AND bi.status = $2
            ORDER BY bi.due_back ASC NULLS LAST, bi.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(borrower_id)
        .bind(LoanStatus::OnLoan)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Available copies, by book title
    pub async fn list_available(&self, page: Page) -> AppResult<(Vec<BookInstanceListing>, i64)> {
        let total = self.count_by_status(LoanStatus::Available).await?;

        let rows = sqlx::query_as::<_, BookInstanceListing>(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.borrower_id, bi.status
            FROM book_instances bi
            JOIN books b ON b.id = bi.book_id
            WHERE bi.status = $1
            ORDER BY b.title ASC, bi.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(LoanStatus::Available)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Create a copy of a book
    pub async fn create(&self, book_id: i32, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let instance = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, book_id, imprint, due_back, borrower_id, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(data.imprint.trim())
        .bind(data.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from_constraint(e, format!("Book with id {} not found", book_id)) {
            AppError::ReferentialIntegrity(msg) => AppError::NotFound(msg),
            other => other,
        })?;

        Ok(instance)
    }

    /// Hand a copy to a borrower until `due_back`.
    ///
    /// The copy and the borrower rows stay locked from the checks to the write.
    pub async fn lend(
        &self,
        id: Uuid,
        borrower_id: i32,
        due_back: NaiveDate,
    ) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;

        let status: LoanStatus =
            sqlx::query_scalar("SELECT status FROM book_instances WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;

        let borrower: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR SHARE")
            .bind(borrower_id)
            .fetch_optional(&mut *tx)
            .await?;

        check_loan(status, borrower.is_some())?;

        let instance = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET borrower_id = $1, due_back = $2, status = $3
            WHERE id = $4
            RETURNING id, book_id, imprint, due_back, borrower_id, status
            "#,
        )
        .bind(borrower_id)
        .bind(due_back)
        .bind(LoanStatus::OnLoan)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(instance)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
