//! Summary cards for the dashboard.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    aggregation::{BudgetOverview, FeeSummary},
    currency::{Currency, format_currency},
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, format_percentage, progress_bar},
};

fn summary_card(id: &str, title: &str, amount: Decimal, currency: Currency) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h3 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-semibold tabular-nums" { (format_currency(amount, currency)) }
        }
    }
}

/// The fee and expense totals.
pub(super) fn summary_cards_view(
    fee_summary: &FeeSummary,
    total_expenses: Decimal,
    currency: Currency,
) -> Markup {
    html! {
        section id="summary" class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 w-full"
        {
            (summary_card("total-fees", "Total Fees", fee_summary.total_fees, currency))
            (summary_card("paid-fees", "Paid Fees", fee_summary.paid_fees, currency))
            (summary_card("pending-fees", "Pending Fees", fee_summary.pending_fees, currency))
            (summary_card("total-expenses", "Total Expenses", total_expenses, currency))
        }
    }
}

/// How much of the user's combined budget has been spent.
pub(super) fn budget_card_view(overview: &BudgetOverview, currency: Currency) -> Markup {
    html! {
        section id="budget-usage" class={ "w-full " (CARD_STYLE) }
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-lg font-semibold" { "Budget Usage" }
                a href=(endpoints::EXPENSES_VIEW) class=(LINK_STYLE) { "Manage budgets" }
            }

            p class="mt-2 text-sm tabular-nums"
            {
                (format_currency(overview.total_spent, currency))
                " spent of "
                (format_currency(overview.total_budget, currency))
            }

            div class="mt-2" { (progress_bar(overview.usage_or_zero())) }

            p class="mt-1 text-sm" { (format_percentage(overview.usage_or_zero())) " used" }
        }
    }
}
