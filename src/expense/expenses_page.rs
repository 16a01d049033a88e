//! The expenses page: the user's expenses and how they compare to their budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    aggregation::total_expenses,
    budget::{Budget, budgets_section, get_budgets},
    category::{ExpenseCategory, find_expense_category, get_expense_categories},
    currency::{Currency, format_currency},
    endpoints::{self, format_endpoint},
    expense::{db::get_expenses, domain::Expense},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    settings::get_currency,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A label in the category's colour.
pub fn category_badge(category: Option<&ExpenseCategory>) -> Markup {
    let (name, color) = category
        .map(|category| (category.name.as_str(), category.color.as_str()))
        .unwrap_or(("Unknown", "#6b7280"));

    html! {
        span
            class="text-xs font-medium px-2.5 py-0.5 rounded text-white"
            style={ "background-color: " (color) }
        {
            (name)
        }
    }
}

fn expense_row(expense: &Expense, categories: &[ExpenseCategory], currency: Currency) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
    let delete_url = format_endpoint(endpoints::EXPENSE, expense.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
        {
            td class=(TABLE_CELL_STYLE) { time datetime=(expense.date) { (expense.date) } }
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                (expense.title)

                @if let Some(description) = &expense.description {
                    p class="text-xs font-normal text-gray-500 dark:text-gray-400" { (description) }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                (category_badge(find_expense_category(categories, expense.category_id)))
            }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(expense.amount.value(), currency)) }
            td class=(TABLE_CELL_STYLE) { (expense.payment_method.label()) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &format!("Are you sure you want to delete '{}'? This cannot be undone.", expense.title),
                        "closest tr",
                        "delete"
                    ))
                }
            }
        }
    }
}

fn expenses_table(expenses: &[Expense], categories: &[ExpenseCategory], currency: Currency) -> Markup {
    html! {
        section id="expenses" class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Payment Method" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        (expense_row(expense, categories, currency))
                    }

                    @if expenses.is_empty() {
                        tr
                        {
                            td colspan="6" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No expenses yet. "
                                a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add an expense" }
                                "."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn expenses_view(
    expenses: &[Expense],
    budgets: &[Budget],
    categories: &[ExpenseCategory],
    currency: Currency,
) -> Result<Markup, Error> {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let total = total_expenses(expenses)?;
    let budgets_view = budgets_section(budgets, expenses, categories, currency)?;

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-8"
            {
                section class="w-full space-y-4"
                {
                    header class="flex justify-between flex-wrap items-end"
                    {
                        div
                        {
                            h1 class="text-xl font-bold" { "Expenses" }
                            p id="expenses-total" class="text-sm text-gray-500 dark:text-gray-400 tabular-nums"
                            {
                                "Total: " (format_currency(total, currency))
                            }
                        }

                        div class="flex gap-4"
                        {
                            a href=(endpoints::EXPORT_EXPENSES) class=(LINK_STYLE) download { "Export CSV" }
                            a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                        }
                    }

                    (expenses_table(expenses, categories, currency))
                }

                (budgets_view)
            }
        }
    };

    Ok(base("Expenses", &[], &content))
}

/// Display the user's expenses and budgets.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (currency, expenses, budgets, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let currency = get_currency(user_id, &connection)?;
        let expenses = get_expenses(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get expenses for user {user_id}: {error}")
        })?;
        let budgets = get_budgets(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get budgets for user {user_id}: {error}")
        })?;
        let categories = get_expense_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get expense categories: {error}"))?;

        (currency, expenses, budgets, categories)
    };

    let page = expenses_view(&expenses, &budgets, &categories, currency).inspect_err(|error| {
        tracing::error!("could not render expenses for user {user_id}: {error}")
    })?;

    Ok(page.into_response())
}
