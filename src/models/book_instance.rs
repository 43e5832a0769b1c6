//! Book instance (loanable copy) model and related types

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgValueRef, Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::validate_not_blank;

/// Loan status of a copy, stored as a one-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Only copies out for maintenance cannot be handed to a borrower
    pub fn is_lendable(&self) -> bool {
        !matches!(self, LoanStatus::Maintenance)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (VARCHAR(1) column)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_code(), buf)
    }
}

/// Book instance row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    /// Meaningful only while the copy is on loan
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
}

/// Book instance row joined with its title, for loan lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceListing {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
    #[sqlx(default)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl BookInstanceListing {
    pub fn with_overdue_flag(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.status == LoanStatus::OnLoan
            && self.due_back.map(|d| d < today).unwrap_or(false);
        self
    }
}

/// Create book instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_initial_status"))]
pub struct CreateBookInstance {
    #[validate(
        length(min = 1, max = 200, message = "Imprint must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub imprint: String,
    /// Maintenance, available or reserved; copies go on loan through the loan form
    pub status: Option<LoanStatus>,
}

fn validate_initial_status(data: &CreateBookInstance) -> Result<(), ValidationError> {
    if data.status == Some(LoanStatus::OnLoan) {
        let mut err = ValidationError::new("status");
        err.message = Some("A new copy cannot start on loan".into());
        return Err(err);
    }
    Ok(())
}

/// Librarian loan form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoanBookForm {
    #[validate(range(min = 1, message = "Borrower is required"))]
    pub borrower_id: i32,
    /// Read-only hint echoed back by clients; never persisted
    #[serde(default)]
    pub book_title: Option<String>,
}

/// State of the loan form as rendered for a GET
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanFormView {
    pub instance: BookInstance,
    /// Read-only
    pub book_title: String,
    /// Due date the copy would get if submitted today
    pub proposed_due_back: NaiveDate,
}

fn form_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Checks of a loan submission against the stored copy and borrower
pub fn check_loan(status: LoanStatus, borrower_exists: bool) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !borrower_exists {
        errors.add("borrower_id", form_error("unknown_borrower", "Borrower does not exist"));
    }
    if !status.is_lendable() {
        errors.add("status", form_error("maintenance", "Copy is under maintenance"));
    }

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Due date for a loan submitted on `submitted_on`
pub fn loan_due_date(submitted_on: NaiveDate, loan_period_days: i64) -> NaiveDate {
    submitted_on + Duration::days(loan_period_days)
}
