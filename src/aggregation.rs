//! Totals computed over lists of fees, expenses and budgets.
//!
//! All sums use exact decimal arithmetic and have no side effects, so calling
//! them twice on the same records gives the same result.

use rust_decimal::Decimal;

use crate::{
    Error,
    budget::Budget,
    expense::Expense,
    fee::{Fee, FeeStatus},
    money::checked_sum,
};

/// The fee totals shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSummary {
    /// The amount of every fee, whatever its status.
    pub total_fees: Decimal,
    /// The amount paid towards fees that have been paid in full.
    pub paid_fees: Decimal,
    /// The amount of fees with nothing paid. Partially paid fees are not included.
    pub pending_fees: Decimal,
}

/// Sum the fees shown on the dashboard cards.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a total does not fit in a [Decimal].
pub fn summarize_fees(fees: &[Fee]) -> Result<FeeSummary, Error> {
    let total_fees = checked_sum(fees.iter().map(|fee| fee.amount.value()))?;
    let paid_fees = checked_sum(
        fees.iter()
            .filter(|fee| fee.status == FeeStatus::Paid)
            .map(|fee| fee.paid_amount),
    )?;
    let pending_fees = checked_sum(
        fees.iter()
            .filter(|fee| fee.status == FeeStatus::Pending)
            .map(|fee| fee.amount.value()),
    )?;

    Ok(FeeSummary {
        total_fees,
        paid_fees,
        pending_fees,
    })
}

/// The fee totals shown on the fee management page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeLedgerTotals {
    pub total: Decimal,
    /// Payments towards every fee, including partial payments.
    pub total_paid: Decimal,
    /// Negative when fees have been overpaid.
    pub outstanding: Decimal,
}

pub fn fee_ledger_totals(fees: &[Fee]) -> Result<FeeLedgerTotals, Error> {
    let total = checked_sum(fees.iter().map(|fee| fee.amount.value()))?;
    let total_paid = checked_sum(fees.iter().map(|fee| fee.paid_amount))?;

    Ok(FeeLedgerTotals {
        total,
        total_paid,
        outstanding: total
            .checked_sub(total_paid)
            .ok_or(Error::AmountOverflow)?,
    })
}

pub fn total_expenses(expenses: &[Expense]) -> Result<Decimal, Error> {
    checked_sum(expenses.iter().map(|expense| expense.amount.value()))
}

/// All budgets compared against all expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BudgetOverview {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    /// `total_spent` as a percentage of `total_budget`, or `None` when there
    /// is no budget to compare against.
    pub usage: Option<Decimal>,
}

impl BudgetOverview {
    /// The usage percentage, treating a missing budget as 0%.
    pub fn usage_or_zero(&self) -> Decimal {
        self.usage.unwrap_or(Decimal::ZERO)
    }
}

/// `part` as a percentage of `whole`.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the percentage does not fit in a [Decimal].
pub(crate) fn checked_percentage(part: Decimal, whole: Decimal) -> Result<Decimal, Error> {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(Error::AmountOverflow)
}

pub fn budget_overview(budgets: &[Budget], expenses: &[Expense]) -> Result<BudgetOverview, Error> {
    let total_budget = checked_sum(budgets.iter().map(|budget| budget.amount.value()))?;
    let total_spent = total_expenses(expenses)?;
    let usage = if total_budget > Decimal::ZERO {
        Some(checked_percentage(total_spent, total_budget)?)
    } else {
        None
    };

    Ok(BudgetOverview {
        total_budget,
        total_spent,
        usage,
    })
}
