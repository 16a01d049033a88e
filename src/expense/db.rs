//! Database access for expenses.
//!
//! Every query filters on `created_by` so users only ever see their own expenses.

use rusqlite::{Connection, Row, params};

use crate::{
    Error, UserID,
    expense::domain::{CreateExpense, Expense, ExpenseId},
};

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            category_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            created_by INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES expense_category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(created_by) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_created_by_date ON expense(created_by, date);",
    )?;

    Ok(())
}

const SELECT_EXPENSE: &str = "SELECT id, title, description, category_id, amount, date, \
    payment_method, created_by FROM expense";

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category_id: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
        payment_method: row.get(6)?,
        created_by: UserID::new(row.get(7)?),
    })
}

/// Record a new expense for `user_id`.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist, or
/// [Error::SqlError] for any other SQL error.
pub fn create_expense(
    user_id: UserID,
    expense: &CreateExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (title, description, category_id, amount, date, payment_method, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            expense.title,
            expense.description,
            expense.category_id,
            expense.amount,
            expense.date,
            expense.payment_method,
            user_id.as_i64()
        ],
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        title: expense.title.clone(),
        description: expense.description.clone(),
        category_id: expense.category_id,
        amount: expense.amount,
        date: expense.date,
        payment_method: expense.payment_method,
        created_by: user_id,
    })
}

/// Retrieve the expense `id` recorded by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the expense does not exist or belongs to another user.
pub fn get_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE id = :id AND created_by = :created_by"
        ))?
        .query_one(
            &[(":id", &id), (":created_by", &user_id.as_i64())],
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Retrieve all expenses recorded by `user_id`, newest first.
pub fn get_expenses(user_id: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE created_by = :created_by ORDER BY date DESC, id DESC"
        ))?
        .query_map(&[(":created_by", &user_id.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Replace every field of the expense `id` recorded by `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingExpense] if the expense does not exist or
/// belongs to another user.
pub fn update_expense(
    id: ExpenseId,
    user_id: UserID,
    expense: &CreateExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection.execute(
        "UPDATE expense
        SET title = ?1, description = ?2, category_id = ?3, amount = ?4, date = ?5, payment_method = ?6
        WHERE id = ?7 AND created_by = ?8",
        params![
            expense.title,
            expense.description,
            expense.category_id,
            expense.amount,
            expense.date,
            expense.payment_method,
            id,
            user_id.as_i64()
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(Expense {
        id,
        title: expense.title.clone(),
        description: expense.description.clone(),
        category_id: expense.category_id,
        amount: expense.amount,
        date: expense.date,
        payment_method: expense.payment_method,
        created_by: user_id,
    })
}

/// Delete the expense `id` recorded by `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingExpense] if the expense does not exist.
pub fn delete_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND created_by = ?2",
        params![id, user_id.as_i64()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

#[cfg(test)]
mod expense_db_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::{Date, macros::date};

    use crate::{
        Error,
        db::initialize,
        expense::domain::CreateExpense,
        money::Amount,
        payment_method::PaymentMethod,
        test_utils::insert_test_user,
    };

    use super::{create_expense, delete_expense, get_expense, get_expenses, update_expense};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn new_expense(title: &str, amount: i64, date: Date) -> CreateExpense {
        CreateExpense {
            title: title.to_owned(),
            description: None,
            category_id: 1,
            amount: Amount::new_unchecked(Decimal::from(amount)),
            date,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn create_and_get_expense() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "a@example.com");

        let expense = create_expense(
            user_id,
            &new_expense("Notebooks", 120, date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();

        assert_eq!(get_expense(expense.id, user_id, &connection), Ok(expense));
    }

    #[test]
    fn create_expense_with_unknown_category_fails() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "a@example.com");
        let mut expense = new_expense("Notebooks", 120, date!(2025 - 01 - 10));
        expense.category_id = 999;

        assert_eq!(
            create_expense(user_id, &expense, &connection),
            Err(Error::InvalidCategory)
        );
    }

    #[test]
    fn users_only_see_their_own_expenses() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "a@example.com");
        let other_user_id = insert_test_user(&connection, "b@example.com");
        let older = create_expense(
            user_id,
            &new_expense("Bus pass", 300, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();
        let newer = create_expense(
            user_id,
            &new_expense("Lunch", 80, date!(2025 - 02 - 01)),
            &connection,
        )
        .unwrap();
        let others = create_expense(
            other_user_id,
            &new_expense("Pens", 40, date!(2025 - 01 - 15)),
            &connection,
        )
        .unwrap();

        assert_eq!(get_expenses(user_id, &connection), Ok(vec![newer, older]));
        assert_eq!(
            get_expense(others.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_replaces_all_fields() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "a@example.com");
        let expense = create_expense(
            user_id,
            &new_expense("Lunch", 80, date!(2025 - 02 - 01)),
            &connection,
        )
        .unwrap();
        let replacement = CreateExpense {
            title: "Dinner".to_owned(),
            description: Some("With classmates".to_owned()),
            category_id: 2,
            amount: Amount::new_unchecked(Decimal::new(15050, 2)),
            date: date!(2025 - 02 - 02),
            payment_method: PaymentMethod::Online,
        };

        let updated = update_expense(expense.id, user_id, &replacement, &connection).unwrap();

        assert_eq!(get_expense(expense.id, user_id, &connection), Ok(updated));
    }

    #[test]
    fn cannot_update_or_delete_another_users_expense() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "a@example.com");
        let other_user_id = insert_test_user(&connection, "b@example.com");
        let expense = create_expense(
            user_id,
            &new_expense("Lunch", 80, date!(2025 - 02 - 01)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            update_expense(
                expense.id,
                other_user_id,
                &new_expense("Stolen", 1, date!(2025 - 02 - 01)),
                &connection
            ),
            Err(Error::UpdateMissingExpense)
        );
        assert_eq!(
            delete_expense(expense.id, other_user_id, &connection),
            Err(Error::DeleteMissingExpense)
        );
        assert!(get_expense(expense.id, user_id, &connection).is_ok());
    }

    #[test]
    fn deletes_expense() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "a@example.com");
        let expense = create_expense(
            user_id,
            &new_expense("Lunch", 80, date!(2025 - 02 - 01)),
            &connection,
        )
        .unwrap();

        delete_expense(expense.id, user_id, &connection).unwrap();

        assert_eq!(
            get_expense(expense.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }
}
