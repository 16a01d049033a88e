//! Dashboard HTTP handler and view rendering.

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
    aggregation::{budget_overview, summarize_fees, total_expenses},
    budget::{Budget, get_budgets},
    category::{ExpenseCategory, FeeCategory, get_expense_categories, get_fee_categories},
    currency::Currency,
    dashboard::{
        cards::{budget_card_view, summary_cards_view},
        tables::{recent_expenses_table, recent_fees_table},
    },
    endpoints,
    expense::{Expense, get_expenses},
    fee::{Fee, get_fees, student_record_notice},
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    profile::get_student_for_user,
    settings::get_currency,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Everything shown on the dashboard.
struct DashboardData {
    /// `None` when the user has not created their student record.
    fees: Option<Vec<Fee>>,
    fee_categories: Vec<FeeCategory>,
    expenses: Vec<Expense>,
    expense_categories: Vec<ExpenseCategory>,
    budgets: Vec<Budget>,
    currency: Currency,
}

fn load_dashboard_data(user_id: UserID, connection: &Connection) -> Result<DashboardData, Error> {
    let fees = match get_student_for_user(user_id, connection) {
        Ok(student) => Some(get_fees(student.id, connection)?),
        Err(Error::StudentRecordMissing) => None,
        Err(error) => return Err(error),
    };

    Ok(DashboardData {
        fees,
        fee_categories: get_fee_categories(connection)?,
        expenses: get_expenses(user_id, connection)?,
        expense_categories: get_expense_categories(connection)?,
        budgets: get_budgets(user_id, connection)?,
        currency: get_currency(user_id, connection)?,
    })
}

fn dashboard_view(data: &DashboardData) -> Result<Markup, Error> {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let fees = data.fees.as_deref().unwrap_or_default();
    let fee_summary = summarize_fees(fees)?;
    let expenses_total = total_expenses(&data.expenses)?;
    let overview = budget_overview(&data.budgets, &data.expenses)?;

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                @if data.fees.is_none() {
                    (student_record_notice())
                }

                (summary_cards_view(&fee_summary, expenses_total, data.currency))
                (budget_card_view(&overview, data.currency))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-6"
                {
                    (recent_fees_table(fees, &data.fee_categories, data.currency))
                    (recent_expenses_table(&data.expenses, &data.expense_categories, data.currency))
                }
            }
        }
    };

    Ok(base("Dashboard", &[], &content))
}

/// Display a page with an overview of the user's fees, expenses and budgets.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_dashboard_data(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not load dashboard for user {user_id}: {error}")
        })?
    };

    let page = dashboard_view(&data).inspect_err(|error| {
        tracing::error!("could not render dashboard for user {user_id}: {error}")
    })?;

    Ok(page.into_response())
}
