//! Expense records and the command used to create or replace them.

use serde::Deserialize;
use time::Date;

use crate::{
    Error, UserID,
    category::ExpenseCategoryId,
    database_id::DatabaseId,
    form::{FORM_DATE_FORMAT, optional_text, required_date, required_id, required_text},
    money::Amount,
    payment_method::PaymentMethod,
};

/// Database identifier for an expense.
pub type ExpenseId = DatabaseId;

/// Money a user spent.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: ExpenseCategoryId,
    pub amount: Amount,
    pub date: Date,
    pub payment_method: PaymentMethod,
    /// The user that recorded the expense and owns it.
    pub created_by: UserID,
}

/// The raw form data for creating or editing an expense.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub payment_method: String,
}

impl ExpenseForm {
    /// Fill the form with the fields of an existing expense.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            title: expense.title.clone(),
            description: expense.description.clone().unwrap_or_default(),
            category_id: expense.category_id.to_string(),
            amount: expense.amount.to_string(),
            date: expense
                .date
                .format(FORM_DATE_FORMAT)
                .unwrap_or_else(|_| expense.date.to_string()),
            payment_method: expense.payment_method.as_str().to_owned(),
        }
    }
}

/// A validated expense, used both to create an expense and to replace one.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateExpense {
    pub title: String,
    pub description: Option<String>,
    pub category_id: ExpenseCategoryId,
    pub amount: Amount,
    pub date: Date,
    pub payment_method: PaymentMethod,
}

impl CreateExpense {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is empty, if the
    /// amount is not a positive number, or if the date or payment method
    /// cannot be parsed.
    pub fn from_form(form: &ExpenseForm) -> Result<Self, Error> {
        Ok(Self {
            title: required_text("Title", &form.title)?,
            description: optional_text(Some(&form.description)),
            category_id: required_id("Category", &form.category_id)?,
            amount: Amount::parse(&form.amount)?,
            date: required_date("Date", &form.date)?,
            payment_method: required_text("Payment method", &form.payment_method)?.parse()?,
        })
    }
}

#[cfg(test)]
mod create_expense_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{Error, money::Amount, payment_method::PaymentMethod};

    use super::{CreateExpense, ExpenseForm};

    fn valid_form() -> ExpenseForm {
        ExpenseForm {
            title: " Chemistry textbook ".to_owned(),
            description: "".to_owned(),
            category_id: "1".to_owned(),
            amount: "849.99".to_owned(),
            date: "2025-02-14".to_owned(),
            payment_method: "card".to_owned(),
        }
    }

    #[test]
    fn builds_command_from_form() {
        assert_eq!(
            CreateExpense::from_form(&valid_form()),
            Ok(CreateExpense {
                title: "Chemistry textbook".to_owned(),
                description: None,
                category_id: 1,
                amount: Amount::new_unchecked(Decimal::new(84999, 2)),
                date: date!(2025 - 02 - 14),
                payment_method: PaymentMethod::Card,
            })
        );
    }

    #[test]
    fn requires_title() {
        let form = ExpenseForm {
            title: "".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            CreateExpense::from_form(&form),
            Err(Error::MissingField("Title"))
        );
    }

    #[test]
    fn rejects_negative_amount() {
        let form = ExpenseForm {
            amount: "-20".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            CreateExpense::from_form(&form),
            Err(Error::NonPositiveAmount(Decimal::from(-20)))
        );
    }

    #[test]
    fn rejects_unknown_payment_method() {
        let form = ExpenseForm {
            payment_method: "barter".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            CreateExpense::from_form(&form),
            Err(Error::InvalidPaymentMethod("barter".to_owned()))
        );
    }
}
