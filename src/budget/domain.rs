//! Budgets and how much of each has been used.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error, UserID,
    aggregation::checked_percentage,
    category::ExpenseCategoryId,
    database_id::DatabaseId,
    expense::Expense,
    form::{required_date, required_id, required_text},
    money::{Amount, checked_sum},
};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// How often a budget resets. Only used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    pub const ALL: [BudgetPeriod; 3] = [
        BudgetPeriod::Monthly,
        BudgetPeriod::Quarterly,
        BudgetPeriod::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Quarterly => "quarterly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Quarterly => "Quarterly",
            BudgetPeriod::Yearly => "Yearly",
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetPeriod::ALL
            .into_iter()
            .find(|period| period.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidBudgetPeriod(s.to_owned()))
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A spending limit for one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub category_id: ExpenseCategoryId,
    /// The spending limit.
    pub amount: Amount,
    pub period: BudgetPeriod,
    pub start_date: Date,
    /// Never before `start_date`.
    pub end_date: Date,
    pub created_by: UserID,
}

/// The raw form data for creating a budget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetForm {
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// A validated request to create a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct SetBudget {
    pub category_id: ExpenseCategoryId,
    pub amount: Amount,
    pub period: BudgetPeriod,
    pub start_date: Date,
    pub end_date: Date,
}

impl SetBudget {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is empty or cannot be
    /// parsed, or [Error::InvalidDateRange] if the end date is before the start date.
    pub fn from_form(form: &BudgetForm) -> Result<Self, Error> {
        let category_id = required_id("Category", &form.category_id)?;
        let amount = Amount::parse(&form.amount)?;
        let period = required_text("Period", &form.period)?.parse()?;
        let start_date = required_date("Start date", &form.start_date)?;
        let end_date = required_date("End date", &form.end_date)?;

        if end_date < start_date {
            return Err(Error::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            category_id,
            amount,
            period,
            start_date,
            end_date,
        })
    }
}

/// How much of a budget has been spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetConsumption {
    pub spent: Decimal,
    /// `spent` as a percentage of the budget. May exceed 100.
    pub percentage: Decimal,
}

impl BudgetConsumption {
    /// The percentage clamped to [0, 100] for drawing a progress bar.
    pub fn bar_width(&self) -> Decimal {
        self.percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }
}

/// Sum the expenses in the budget's category and compare them to the limit.
///
/// Every expense in the category counts, whatever its date. The budget's
/// date range is not applied.
///
/// # Errors
///
/// Returns:
/// - [Error::ZeroBudgetAmount] if the stored limit is zero.
/// - [Error::AmountOverflow] if the amount spent or its percentage does not fit in a [Decimal].
pub fn consumption(budget: &Budget, expenses: &[Expense]) -> Result<BudgetConsumption, Error> {
    let limit = budget.amount.value();

    if limit.is_zero() {
        return Err(Error::ZeroBudgetAmount(budget.id));
    }

    let spent = checked_sum(
        expenses
            .iter()
            .filter(|expense| expense.category_id == budget.category_id)
            .map(|expense| expense.amount.value()),
    )?;

    Ok(BudgetConsumption {
        spent,
        percentage: checked_percentage(spent, limit)?,
    })
}

#[cfg(test)]
mod set_budget_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{Error, money::Amount};

    use super::{BudgetForm, BudgetPeriod, SetBudget};

    fn valid_form() -> BudgetForm {
        BudgetForm {
            category_id: "2".to_owned(),
            amount: "5000".to_owned(),
            period: "monthly".to_owned(),
            start_date: "2025-01-01".to_owned(),
            end_date: "2025-01-31".to_owned(),
        }
    }

    #[test]
    fn builds_command_from_form() {
        assert_eq!(
            SetBudget::from_form(&valid_form()),
            Ok(SetBudget {
                category_id: 2,
                amount: Amount::new_unchecked(Decimal::from(5000)),
                period: BudgetPeriod::Monthly,
                start_date: date!(2025 - 01 - 01),
                end_date: date!(2025 - 01 - 31),
            })
        );
    }

    #[test]
    fn end_date_may_equal_start_date() {
        let form = BudgetForm {
            end_date: "2025-01-01".to_owned(),
            ..valid_form()
        };

        assert!(SetBudget::from_form(&form).is_ok());
    }

    #[test]
    fn rejects_end_date_before_start_date() {
        let form = BudgetForm {
            start_date: "2025-02-01".to_owned(),
            end_date: "2025-01-31".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            SetBudget::from_form(&form),
            Err(Error::InvalidDateRange {
                start: date!(2025 - 02 - 01),
                end: date!(2025 - 01 - 31),
            })
        );
    }

    #[test]
    fn rejects_unknown_period() {
        let form = BudgetForm {
            period: "weekly".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            SetBudget::from_form(&form),
            Err(Error::InvalidBudgetPeriod("weekly".to_owned()))
        );
    }
}
