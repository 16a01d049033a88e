//! Defines the route handler for the page for creating an expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    category::get_expense_categories,
    endpoints,
    expense::{
        domain::ExpenseForm,
        form::{ExpenseFormTarget, expense_form},
    },
    form::FORM_DATE_FORMAT,
    html::{FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The page layout around an expense form.
pub(super) fn expense_page(title: &str, form: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full space-y-4"
            {
                h1 class="text-xl font-bold" { (title) }

                (form)

                p class="text-sm" { (link(endpoints::EXPENSES_VIEW, "Back to expenses")) }
            }
        }
    };

    base(title, &[], &content)
}

fn format_form_date(date: Date) -> String {
    date.format(FORM_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Renders the page for creating an expense, with the date set to today.
pub async fn get_create_expense_page(
    State(state): State<CreateExpenseState>,
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

    let form = ExpenseForm {
        date: format_form_date(today),
        ..Default::default()
    };

    Ok(expense_page(
        "Add Expense",
        expense_form(&form, &categories, ExpenseFormTarget::Create, None),
    )
    .into_response())
}
