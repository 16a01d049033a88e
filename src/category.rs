//! Fee and expense categories.
//!
//! Categories are shared by all users and seeded when the database is initialized.

use rusqlite::{Connection, Row};

use crate::{Error, database_id::DatabaseId};

/// Database identifier for a fee category.
pub type FeeCategoryId = DatabaseId;

/// Database identifier for an expense category.
pub type ExpenseCategoryId = DatabaseId;

/// A kind of fee owed to the institution, e.g. tuition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCategory {
    pub id: FeeCategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Whether the fee is charged every term rather than once.
    pub is_recurring: bool,
}

/// A kind of expense, e.g. books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseCategory {
    pub id: ExpenseCategoryId,
    pub name: String,
    pub description: Option<String>,
    /// A CSS hex colour used for the category's badge.
    pub color: String,
}

const DEFAULT_FEE_CATEGORIES: [(&str, &str, bool); 5] = [
    ("Tuition", "Term tuition fees", true),
    ("Library", "Library membership and fines", false),
    ("Laboratory", "Laboratory equipment and materials", true),
    ("Transport", "School bus and transport", true),
    ("Examination", "Examination and certification fees", false),
];

const DEFAULT_EXPENSE_CATEGORIES: [(&str, &str, &str); 5] = [
    ("Books & Supplies", "Textbooks and course materials", "#3b82f6"),
    ("Food", "Meals and snacks", "#f59e0b"),
    ("Transport", "Travel to and from school", "#10b981"),
    ("Stationery", "Pens, notebooks and printing", "#8b5cf6"),
    ("Other", "Everything else", "#6b7280"),
];

/// Create the fee and expense category tables.
pub fn create_category_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS fee_category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            is_recurring INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS expense_category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            color TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Insert the default categories, skipping any that already exist.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut insert_fee_category = connection.prepare(
        "INSERT OR IGNORE INTO fee_category (name, description, is_recurring) VALUES (?1, ?2, ?3)",
    )?;

    for (name, description, is_recurring) in DEFAULT_FEE_CATEGORIES {
        insert_fee_category.execute((name, description, is_recurring))?;
    }

    let mut insert_expense_category = connection.prepare(
        "INSERT OR IGNORE INTO expense_category (name, description, color) VALUES (?1, ?2, ?3)",
    )?;

    for (name, description, color) in DEFAULT_EXPENSE_CATEGORIES {
        insert_expense_category.execute((name, description, color))?;
    }

    Ok(())
}

/// Retrieve all fee categories ordered by name.
pub fn get_fee_categories(connection: &Connection) -> Result<Vec<FeeCategory>, Error> {
    connection
        .prepare("SELECT id, name, description, is_recurring FROM fee_category ORDER BY name ASC")?
        .query_map([], map_fee_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Retrieve all expense categories ordered by name.
pub fn get_expense_categories(connection: &Connection) -> Result<Vec<ExpenseCategory>, Error> {
    connection
        .prepare("SELECT id, name, description, color FROM expense_category ORDER BY name ASC")?
        .query_map([], map_expense_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Look up the name of a category in `categories`, falling back to "Unknown".
pub fn fee_category_name(categories: &[FeeCategory], id: FeeCategoryId) -> &str {
    categories
        .iter()
        .find(|category| category.id == id)
        .map(|category| category.name.as_str())
        .unwrap_or("Unknown")
}

/// Look up an expense category in `categories`.
pub fn find_expense_category(
    categories: &[ExpenseCategory],
    id: ExpenseCategoryId,
) -> Option<&ExpenseCategory> {
    categories.iter().find(|category| category.id == id)
}

fn map_fee_category_row(row: &Row) -> Result<FeeCategory, rusqlite::Error> {
    Ok(FeeCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_recurring: row.get(3)?,
    })
}

fn map_expense_category_row(row: &Row) -> Result<ExpenseCategory, rusqlite::Error> {
    Ok(ExpenseCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
    })
}
