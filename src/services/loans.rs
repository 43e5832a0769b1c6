//! Loan management service: loan lists and the librarian loan workflow

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::book_instance::{
        loan_due_date, BookInstance, BookInstanceListing, CreateBookInstance, LoanBookForm,
        LoanFormView,
    },
    repository::{Page, Repository},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    loan_period_days: i64,
}

impl LoansService {
    pub fn new(repository: Repository, config: &CatalogConfig) -> Self {
        Self {
            repository,
            loan_period_days: config.loan_period_days,
        }
    }

    /// Copies on loan to a user, earliest due first
    pub async fn loans_for(
        &self,
        user_id: i32,
        page: Page,
        today: NaiveDate,
    ) -> AppResult<(Vec<BookInstanceListing>, i64)> {
        let (rows, total) = self.repository.book_instances.list_on_loan_to(user_id, page).await?;
        let rows = rows.into_iter().map(|r| r.with_overdue_flag(today)).collect();
        Ok((rows, total))
    }

    /// Available copies, by title
    pub async fn available(&self, page: Page) -> AppResult<(Vec<BookInstanceListing>, i64)> {
        self.repository.book_instances.list_available(page).await
    }

    /// Add a copy to a book
    pub async fn create_instance(
        &self,
        book_id: i32,
        data: CreateBookInstance,
    ) -> AppResult<BookInstance> {
        data.validate()?;
        let instance = self.repository.book_instances.create(book_id, &data).await?;
        tracing::info!("Book instance created: id={} book_id={}", instance.id, book_id);
        Ok(instance)
    }

    /// Form state for lending a copy
    pub async fn loan_form(&self, id: Uuid, today: NaiveDate) -> AppResult<LoanFormView> {
        let listing = self.repository.book_instances.get_listing(id).await?;

        Ok(LoanFormView {
            book_title: listing.book_title,
            instance: BookInstance {
                id: listing.id,
                book_id: listing.book_id,
                imprint: listing.imprint,
                due_back: listing.due_back,
                borrower_id: listing.borrower_id,
                status: listing.status,
            },
            proposed_due_back: loan_due_date(today, self.loan_period_days),
        })
    }

    /// Lend (or renew) a copy: due back `loan_period_days` after `submitted_on`.
    ///
    /// Nothing is written when the form is rejected.
    pub async fn submit_loan(
        &self,
        id: Uuid,
        form: LoanBookForm,
        submitted_on: NaiveDate,
    ) -> AppResult<BookInstance> {
        form.validate()?;

        let due_back = loan_due_date(submitted_on, self.loan_period_days);
        let updated = self
            .repository
            .book_instances
            .lend(id, form.borrower_id, due_back)
            .await?;

        tracing::info!(
            "Book instance {} lent to user {} until {}",
            id,
            form.borrower_id,
            due_back
        );
        Ok(updated)
    }
}
