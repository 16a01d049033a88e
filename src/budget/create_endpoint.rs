//! Defines the endpoint for setting a budget.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID,
    budget::{
        create_page::{CreateBudgetState, budget_form},
        db::create_budget,
        domain::{BudgetForm, SetBudget},
    },
    capitalise_first_char,
    category::get_expense_categories,
    endpoints,
};

/// A route handler for setting a budget, redirects to the expenses view on success.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let command = match SetBudget::from_form(&form) {
        Ok(command) => command,
        Err(error) => {
            let categories = match get_expense_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let message = capitalise_first_char(&error.to_string());

            return budget_form(&form, &categories, Some(&message)).into_response();
        }
    };

    match create_budget(user_id, &command, &connection) {
        Ok(budget) => {
            tracing::info!("user {user_id} set budget {}", budget.id);

            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create budget for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
