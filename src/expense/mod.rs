//! Expenses recorded by a user and the pages for managing them.

mod create_endpoint;
mod create_page;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod edit_page;
mod expenses_page;
mod form;

pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_create_expense_page;
pub use db::{create_expense, create_expense_table, get_expenses};
pub use delete_endpoint::delete_expense_endpoint;
pub use domain::{CreateExpense, Expense, ExpenseId};
pub use edit_endpoint::edit_expense_endpoint;
pub use edit_page::get_edit_expense_page;
pub use expenses_page::{category_badge, get_expenses_page};
