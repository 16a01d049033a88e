//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    auth::create_user_table,
    budget::create_budget_table,
    category::{create_category_tables, seed_default_categories},
    expense::create_expense_table,
    fee::create_fee_table,
    profile::create_profile_tables,
    settings::create_preferences_table,
};

/// Create the tables for the domain models and seed the default categories.
///
/// Foreign key enforcement is turned on for `connection`. Calling this
/// function on an initialized database leaves existing rows untouched.
///
/// # Errors
/// Returns an error if a table could not be created or the categories could
/// not be seeded, in which case no changes are made.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_profile_tables(&transaction)?;
    create_category_tables(&transaction)?;
    create_fee_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_preferences_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    fn table_names(connection: &Connection) -> Vec<String> {
        connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let tables = table_names(&connection);
        for table in [
            "budget",
            "expense",
            "expense_category",
            "fee",
            "fee_category",
            "profile",
            "student",
            "user",
            "user_preferences",
        ] {
            assert!(
                tables.iter().any(|name| name == table),
                "missing table {table}, got {tables:?}"
            );
        }
    }

    #[test]
    fn can_initialize_twice() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        initialize(&connection).unwrap();

        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM fee_category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let enabled: bool = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert!(enabled);
    }
}
