//! Database access for budgets.

use rusqlite::{Connection, Row, params};

use crate::{
    Error, UserID,
    budget::domain::{Budget, BudgetId, SetBudget},
};

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            period TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            created_by INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES expense_category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(created_by) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        amount: row.get(2)?,
        period: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        created_by: UserID::new(row.get(6)?),
    })
}

/// Create a budget owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist.
pub fn create_budget(
    user_id: UserID,
    budget: &SetBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (category_id, amount, period, start_date, end_date, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            budget.category_id,
            budget.amount,
            budget.period,
            budget.start_date,
            budget.end_date,
            user_id.as_i64()
        ],
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        category_id: budget.category_id,
        amount: budget.amount,
        period: budget.period,
        start_date: budget.start_date,
        end_date: budget.end_date,
        created_by: user_id,
    })
}

/// Retrieve the budgets owned by `user_id`, most recent first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category_id, amount, period, start_date, end_date, created_by
            FROM budget WHERE created_by = :created_by
            ORDER BY start_date DESC, id DESC",
        )?
        .query_map(&[(":created_by", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Delete the budget `id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingBudget] if the budget does not exist.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND created_by = ?2",
        params![id, user_id.as_i64()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}
