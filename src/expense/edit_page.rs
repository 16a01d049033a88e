//! Defines the route handler for the page for editing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    cache::RecordCache,
    category::get_expense_categories,
    expense::{
        create_page::expense_page,
        db::get_expense,
        domain::{Expense, ExpenseForm, ExpenseId},
        form::{ExpenseFormTarget, expense_form},
    },
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub expense_cache: RecordCache<ExpenseId, Expense>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            expense_cache: state.expense_cache.clone(),
        }
    }
}

/// Get the expense `expense_id` recorded by `user_id`, going through `cache`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the expense does not exist or belongs to another user.
pub(super) fn load_user_expense(
    cache: &RecordCache<ExpenseId, Expense>,
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = cache.get_or_load(expense_id, || get_expense(expense_id, user_id, connection))?;

    if expense.created_by != user_id {
        return Err(Error::NotFound);
    }

    Ok(expense)
}

/// Renders the page for editing an expense.
pub async fn get_edit_expense_page(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = load_user_expense(&state.expense_cache, expense_id, user_id, &connection)?;
    let categories = get_expense_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get expense categories: {error}"))?;

    Ok(expense_page(
        "Edit Expense",
        expense_form(
            &ExpenseForm::from_expense(&expense),
            &categories,
            ExpenseFormTarget::Edit(expense_id),
            None,
        ),
    )
    .into_response())
}

#[cfg(test)]
mod edit_expense_page_tests {
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
        Error,
        cache::RecordCache,
        db::initialize,
        endpoints::{self, format_endpoint},
        expense::{db::create_expense, domain::CreateExpense},
        money::Amount,
        payment_method::PaymentMethod,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html,
            insert_test_user, must_get_form, parse_html_document,
        },
    };

    use super::{EditExpenseState, get_edit_expense_page};

    fn new_expense() -> CreateExpense {
        CreateExpense {
            title: "Calculator".to_owned(),
            description: None,
            category_id: 1,
            amount: Amount::new_unchecked(Decimal::new(129999, 2)),
            date: date!(2025 - 04 - 09),
            payment_method: PaymentMethod::Card,
        }
    }

    #[tokio::test]
    async fn form_is_filled_with_expense() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "a@example.com");
        let expense = create_expense(user_id, &new_expense(), &connection).unwrap();
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            expense_cache: RecordCache::default(),
        };

        let response = get_edit_expense_page(State(state), Extension(user_id), Path(expense.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::EXPENSE, expense.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "title", "text", "Calculator");
        assert_form_input_with_value(&form, "amount", "number", "1299.99");
        assert_form_input_with_value(&form, "date", "date", "2025-04-09");
    }

    #[tokio::test]
    async fn another_users_expense_is_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let owner_id = insert_test_user(&connection, "owner@example.com");
        let intruder_id = insert_test_user(&connection, "intruder@example.com");
        let expense = create_expense(owner_id, &new_expense(), &connection).unwrap();
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            expense_cache: RecordCache::default(),
        };
        state
            .expense_cache
            .get_or_load(expense.id, || Ok::<_, Error>(expense.clone()))
            .unwrap();

        let result =
            get_edit_expense_page(State(state), Extension(intruder_id), Path(expense.id)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
