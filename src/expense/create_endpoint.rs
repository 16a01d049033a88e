//! Defines the endpoint for creating a new expense.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID, capitalise_first_char,
    category::get_expense_categories,
    endpoints,
    expense::{
        create_page::CreateExpenseState,
        db::create_expense,
        domain::{CreateExpense, ExpenseForm},
        form::{ExpenseFormTarget, expense_form},
    },
};

/// A route handler for creating a new expense, redirects to the expenses view on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let command = match CreateExpense::from_form(&form) {
        Ok(command) => command,
        Err(error) => {
            let categories = match get_expense_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let message = capitalise_first_char(&error.to_string());

            return expense_form(&form, &categories, ExpenseFormTarget::Create, Some(&message))
                .into_response();
        }
    };

    if let Err(error) = create_expense(user_id, &command, &connection) {
        tracing::error!("could not create expense for user {user_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
