//! Defines the endpoint for deleting an expense.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserID,
    alert::Alert,
    expense::{db::delete_expense, domain::ExpenseId, edit_page::EditExpenseState},
};

/// A route handler for deleting an expense, responds with an alert.
pub async fn delete_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(expense_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => {
            state.expense_cache.invalidate(expense_id);

            Alert::SuccessSimple {
                message: "Expense deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("could not delete expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        cache::RecordCache,
        db::initialize,
        expense::{
            db::{create_expense, get_expenses},
            domain::CreateExpense,
            edit_page::EditExpenseState,
        },
        money::Amount,
        payment_method::PaymentMethod,
        test_utils::insert_test_user,
    };

    use super::delete_expense_endpoint;

    #[tokio::test]
    async fn deletes_own_expense_only() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "a@example.com");
        let other_user_id = insert_test_user(&connection, "b@example.com");
        let expense = create_expense(
            user_id,
            &CreateExpense {
                title: "Snacks".to_owned(),
                description: None,
                category_id: 2,
                amount: Amount::new_unchecked(Decimal::from(60)),
                date: date!(2025 - 02 - 11),
                payment_method: PaymentMethod::Cash,
            },
            &connection,
        )
        .unwrap();
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            expense_cache: RecordCache::default(),
        };

        let response = delete_expense_endpoint(
            State(state.clone()),
            Extension(other_user_id),
            Path(expense.id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            delete_expense_endpoint(State(state.clone()), Extension(user_id), Path(expense.id))
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            get_expenses(user_id, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }
}
