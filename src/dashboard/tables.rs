//! Tables of the most recent fees and expenses.

use maud::{Markup, html};

use crate::{
    category::{ExpenseCategory, FeeCategory, fee_category_name, find_expense_category},
    currency::{Currency, format_currency},
    endpoints,
    expense::{Expense, category_badge},
    fee::{Fee, status_badge},
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE},
};

/// The number of rows shown in each table.
pub(super) const RECENT_ROWS: usize = 5;

fn table_section(id: &str, title: &str, view_all_url: &str, header: Markup, rows: Markup) -> Markup {
    html! {
        section id=(id) class="w-full space-y-2"
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-lg font-semibold" { (title) }
                a href=(view_all_url) class=(LINK_STYLE) { "View all" }
            }

            div class="w-full overflow-x-auto dark:bg-gray-800"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE) { (header) }
                    tbody { (rows) }
                }
            }
        }
    }
}

/// The most recent fees with their status.
pub(super) fn recent_fees_table(
    fees: &[Fee],
    categories: &[FeeCategory],
    currency: Currency,
) -> Markup {
    let header = html! {
        tr
        {
            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
            th scope="col" class="px-6 py-3 text-right" { "Amount" }
            th scope="col" class=(TABLE_CELL_STYLE) { "Due Date" }
            th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
        }
    };

    let rows = html! {
        @for fee in fees.iter().take(RECENT_ROWS) {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (fee_category_name(categories, fee.category_id)) }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(fee.amount.value(), currency)) }
                td class=(TABLE_CELL_STYLE) { time datetime=(fee.due_date) { (fee.due_date) } }
                td class=(TABLE_CELL_STYLE) { (status_badge(fee.status)) }
            }
        }

        @if fees.is_empty() {
            tr
            {
                td colspan="4" class="px-6 py-4 text-center" { "No fees yet." }
            }
        }
    };

    table_section("recent-fees", "Recent Fees", endpoints::FEES_VIEW, header, rows)
}

/// The most recent expenses.
pub(super) fn recent_expenses_table(
    expenses: &[Expense],
    categories: &[ExpenseCategory],
    currency: Currency,
) -> Markup {
    let header = html! {
        tr
        {
            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
            th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
            th scope="col" class="px-6 py-3 text-right" { "Amount" }
        }
    };

    let rows = html! {
        @for expense in expenses.iter().take(RECENT_ROWS) {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { time datetime=(expense.date) { (expense.date) } }
                td class=(TABLE_CELL_STYLE) { (expense.title) }
                td class=(TABLE_CELL_STYLE)
                {
                    (category_badge(find_expense_category(categories, expense.category_id)))
                }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(expense.amount.value(), currency)) }
            }
        }

        @if expenses.is_empty() {
            tr
            {
                td colspan="4" class="px-6 py-4 text-center" { "No expenses yet." }
            }
        }
    };

    table_section(
        "recent-expenses",
        "Recent Expenses",
        endpoints::EXPENSES_VIEW,
        header,
        rows,
    )
}
