//! Defines the endpoint for replacing an expense.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID, capitalise_first_char,
    category::get_expense_categories,
    endpoints,
    expense::{
        db::update_expense,
        domain::{CreateExpense, ExpenseForm, ExpenseId},
        edit_page::{EditExpenseState, load_user_expense},
        form::{ExpenseFormTarget, expense_form},
    },
};

/// A route handler for replacing every field of an expense, redirects to the
/// expenses view on success.
pub async fn edit_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = load_user_expense(&state.expense_cache, expense_id, user_id, &connection)
    {
        tracing::warn!("user {user_id} could not edit expense {expense_id}: {error}");
        return match error {
            Error::NotFound => Error::UpdateMissingExpense.into_alert_response(),
            error => error.into_alert_response(),
        };
    }

    let command = match CreateExpense::from_form(&form) {
        Ok(command) => command,
        Err(error) => {
            let categories = match get_expense_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let message = capitalise_first_char(&error.to_string());

            return expense_form(
                &form,
                &categories,
                ExpenseFormTarget::Edit(expense_id),
                Some(&message),
            )
            .into_response();
        }
    };

    if let Err(error) = update_expense(expense_id, user_id, &command, &connection) {
        tracing::error!("could not update expense {expense_id}: {error}");
        return error.into_alert_response();
    }

    state.expense_cache.invalidate(expense_id);

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod edit_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        cache::RecordCache,
        db::initialize,
        endpoints,
        expense::{
            db::{create_expense, get_expense},
            domain::{CreateExpense, Expense, ExpenseForm},
            edit_page::EditExpenseState,
        },
        money::Amount,
        payment_method::PaymentMethod,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, insert_test_user, must_get_form,
            parse_html_fragment,
        },
        UserID,
    };

    use super::edit_expense_endpoint;

    fn setup() -> (EditExpenseState, UserID, Expense) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "a@example.com");
        let expense = create_expense(
            user_id,
            &CreateExpense {
                title: "Bus pass".to_owned(),
                description: None,
                category_id: 3,
                amount: Amount::new_unchecked(Decimal::from(600)),
                date: date!(2025 - 01 - 02),
                payment_method: PaymentMethod::Cash,
            },
            &connection,
        )
        .unwrap();

        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            expense_cache: RecordCache::default(),
        };

        (state, user_id, expense)
    }

    fn edited_form() -> ExpenseForm {
        ExpenseForm {
            title: "Monthly bus pass".to_owned(),
            description: "January".to_owned(),
            category_id: "3".to_owned(),
            amount: "650".to_owned(),
            date: "2025-01-03".to_owned(),
            payment_method: "online".to_owned(),
        }
    }

    #[tokio::test]
    async fn replaces_expense_and_clears_cache() {
        let (state, user_id, expense) = setup();
        state
            .expense_cache
            .get_or_load(expense.id, || Ok::<_, Error>(expense.clone()))
            .unwrap();

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(expense.id),
            Form(edited_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        assert!(!state.expense_cache.contains(expense.id));
        let updated = get_expense(expense.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.title, "Monthly bus pass");
        assert_eq!(updated.description.as_deref(), Some("January"));
        assert_eq!(updated.amount.value(), Decimal::from(650));
        assert_eq!(updated.payment_method, PaymentMethod::Online);
    }

    #[tokio::test]
    async fn invalid_amount_rerenders_form_without_changes() {
        let (state, user_id, expense) = setup();
        let form = ExpenseForm {
            amount: "lots".to_owned(),
            ..edited_form()
        };

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(expense.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "\"lots\" is not a valid amount, enter a number with at most two decimal places",
        );
        assert_eq!(
            get_expense(expense.id, user_id, &state.db_connection.lock().unwrap()),
            Ok(expense)
        );
    }

    #[tokio::test]
    async fn cannot_edit_another_users_expense() {
        let (state, _, expense) = setup();
        let intruder_id = insert_test_user(&state.db_connection.lock().unwrap(), "b@example.com");

        let response = edit_expense_endpoint(
            State(state),
            Extension(intruder_id),
            Path(expense.id),
            Form(edited_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
