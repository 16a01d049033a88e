//! Defines the route handler for the page for setting a budget.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, util::days_in_year_month};

use crate::{
    AppState, Error,
    budget::domain::{BudgetForm, BudgetPeriod},
    category::{ExpenseCategory, get_expense_categories},
    endpoints,
    form::FORM_DATE_FORMAT,
    html::{FORM_CONTAINER_STYLE, InputField, base, form_error, link, select_input, submit_button},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed to set a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

pub(super) fn budget_form(
    form: &BudgetForm,
    categories: &[ExpenseCategory],
    error_message: Option<&str>,
) -> Markup {
    let category_options: Vec<_> = categories
        .iter()
        .map(|category| (category.id.to_string(), category.name.clone()))
        .collect();
    let periods: Vec<_> = BudgetPeriod::ALL
        .iter()
        .map(|period| (period.as_str().to_owned(), period.label().to_owned()))
        .collect();

    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            (form_error(error_message))

            (select_input("Category", "category_id", &category_options, &form.category_id, Some("Select a category")))
            (InputField::required("Limit", "amount", "number", &form.amount).into_html())
            (select_input("Period", "period", &periods, &form.period, None))
            (InputField::required("Start Date", "start_date", "date", &form.start_date).into_html())
            (InputField::required("End Date", "end_date", "date", &form.end_date).into_html())

            (submit_button("Set Budget"))
        }
    }
}

fn create_budget_view(form: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full space-y-4"
            {
                h1 class="text-xl font-bold" { "Set Budget" }

                (form)

                p class="text-sm" { (link(endpoints::EXPENSES_VIEW, "Back to expenses")) }
            }
        }
    };

    base("Set Budget", &[], &content)
}

/// The first and last day of the month containing `today`.
fn month_containing(today: Date) -> (Date, Date) {
    let start = today.replace_day(1).unwrap_or(today);
    let end = Date::from_calendar_date(
        today.year(),
        today.month(),
        days_in_year_month(today.year(), today.month()),
    )
    .unwrap_or(today);

    (start, end)
}

fn format_form_date(date: Date) -> String {
    date.format(FORM_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Renders the page for setting a budget, defaulting to a monthly budget for
/// the current month.
pub async fn get_create_budget_page(
    State(state): State<CreateBudgetState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not get today's date: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_expense_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get expense categories: {error}"))?;

    let (start_date, end_date) = month_containing(today);
    let form = BudgetForm {
        period: BudgetPeriod::Monthly.as_str().to_owned(),
        start_date: format_form_date(start_date),
        end_date: format_form_date(end_date),
        ..Default::default()
    };

    Ok(create_budget_view(budget_form(&form, &categories, None)).into_response())
}
