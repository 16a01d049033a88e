//! Fee records, the status rules and the payment transition.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    category::FeeCategoryId,
    database_id::DatabaseId,
    form::{optional_text, required_date, required_id},
    money::Amount,
    payment_method::PaymentMethod,
    profile::StudentId,
};

/// Database identifier for a fee.
pub type FeeId = DatabaseId;

/// How much of a fee has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeStatus {
    /// Nothing has been paid.
    Pending,
    /// Some, but not all, of the fee has been paid.
    Partial,
    /// The fee has been paid in full.
    Paid,
}

impl FeeStatus {
    /// The value stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "pending",
            FeeStatus::Partial => "partial",
            FeeStatus::Paid => "paid",
        }
    }
}

impl Display for FeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FeeStatus::Pending),
            "partial" => Ok(FeeStatus::Partial),
            "paid" => Ok(FeeStatus::Paid),
            other => Err(format!("unknown fee status \"{other}\"")),
        }
    }
}

impl ToSql for FeeStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FeeStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// Compute the status of a fee of `amount` of which `paid_amount` has been paid.
///
/// Overpayments count as paid.
pub fn resolve_status(amount: Decimal, paid_amount: Decimal) -> FeeStatus {
    if paid_amount >= amount {
        FeeStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        FeeStatus::Partial
    } else {
        FeeStatus::Pending
    }
}

/// A fee owed by a student.
#[derive(Debug, Clone, PartialEq)]
pub struct Fee {
    /// The ID of the fee.
    pub id: FeeId,
    /// The student that owes the fee.
    pub student_id: StudentId,
    /// What the fee is for.
    pub category_id: FeeCategoryId,
    /// The full amount owed.
    pub amount: Amount,
    /// The running total of payments. Never decreases.
    pub paid_amount: Decimal,
    /// When the fee must be paid by.
    pub due_date: Date,
    /// Always equal to `resolve_status(amount, paid_amount)`.
    pub status: FeeStatus,
    /// The date of the most recent payment.
    pub paid_date: Option<Date>,
    /// How the most recent payment was made.
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl Fee {
    /// The amount left to pay, or zero if the fee has been overpaid.
    pub fn remaining_balance(&self) -> Decimal {
        self.amount
            .value()
            .saturating_sub(self.paid_amount)
            .max(Decimal::ZERO)
    }

    /// Apply `payment` made on `today` and return the updated fee.
    ///
    /// The payment amount is always positive, so `paid_amount` strictly
    /// increases and the status can only move towards [FeeStatus::Paid].
    /// A payment without a method or notes keeps the fee's current ones.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountOverflow] if the new paid amount does not fit in a [Decimal].
    pub fn apply_payment(&self, payment: &RecordPayment, today: Date) -> Result<Fee, Error> {
        let paid_amount = self
            .paid_amount
            .checked_add(payment.amount.value())
            .ok_or(Error::AmountOverflow)?;

        Ok(Fee {
            paid_amount,
            status: resolve_status(self.amount.value(), paid_amount),
            paid_date: Some(today),
            payment_method: payment.payment_method.or(self.payment_method),
            notes: payment.notes.clone().or_else(|| self.notes.clone()),
            ..self.clone()
        })
    }
}

/// The form data for creating a fee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeeForm {
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub notes: String,
}

/// A validated request to create a fee.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateFee {
    pub category_id: FeeCategoryId,
    pub amount: Amount,
    pub due_date: Date,
    pub notes: Option<String>,
}

impl CreateFee {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is empty, or if the
    /// amount or due date cannot be parsed.
    pub fn from_form(form: &FeeForm) -> Result<Self, Error> {
        Ok(Self {
            category_id: required_id("Category", &form.category_id)?,
            amount: Amount::parse(&form.amount)?,
            due_date: required_date("Due date", &form.due_date)?,
            notes: optional_text(Some(&form.notes)),
        })
    }
}

/// The form data for recording a payment against a fee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub notes: String,
}

/// A validated payment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayment {
    /// Always greater than zero.
    pub amount: Amount,
    pub payment_method: Option<PaymentMethod>,
    /// Replaces the fee's notes when set.
    pub notes: Option<String>,
}

impl RecordPayment {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::InvalidAmount] if the amount is not a number,
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - [Error::InvalidPaymentMethod] if the payment method is not supported.
    pub fn from_form(form: &PaymentForm) -> Result<Self, Error> {
        let payment_method = match optional_text(Some(&form.payment_method)) {
            Some(method) => Some(method.parse()?),
            None => None,
        };

        Ok(Self {
            amount: Amount::parse(&form.amount)?,
            payment_method,
            notes: optional_text(Some(&form.notes)),
        })
    }
}
